fn main() {
    slint_build::compile("ui/overlay.slint").expect("failed to compile overlay.slint");
}
