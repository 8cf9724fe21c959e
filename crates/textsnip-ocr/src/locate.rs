use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Where to point users who do not have Tesseract installed
pub const INSTALL_HINT: &str = "https://github.com/UB-Mannheim/tesseract/wiki";

#[cfg(windows)]
const EXECUTABLE: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE: &str = "tesseract";

/// Common install locations, checked when `tesseract` is not on PATH
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    #[cfg(windows)]
    {
        candidates.push(PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe"));
        candidates.push(PathBuf::from(r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe"));
        if let Some(local) = std::env::var_os("LOCALAPPDATA") {
            candidates.push(Path::new(&local).join("Tesseract-OCR").join(EXECUTABLE));
        }
    }

    #[cfg(not(windows))]
    {
        candidates.push(PathBuf::from("/usr/bin/tesseract"));
        candidates.push(PathBuf::from("/usr/local/bin/tesseract"));
        candidates.push(PathBuf::from("/opt/homebrew/bin/tesseract"));
    }

    candidates
}

/// Locate a usable Tesseract executable.
///
/// PATH wins, then the built-in locations, then `extra`.
pub fn locate_tesseract(extra: &[PathBuf]) -> Option<PathBuf> {
    if responds(Path::new(EXECUTABLE)) {
        tracing::debug!("Found {} on PATH", EXECUTABLE);
        return Some(PathBuf::from(EXECUTABLE));
    }

    let candidates: Vec<PathBuf> = default_candidates()
        .into_iter()
        .chain(extra.iter().cloned())
        .collect();

    let found = first_existing(&candidates);
    match &found {
        Some(path) => tracing::debug!("Found Tesseract at {}", path.display()),
        None => tracing::debug!("Tesseract not found in {} locations", candidates.len()),
    }
    found
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// True if `program --version` runs and exits cleanly.
fn responds(program: &Path) -> bool {
    let mut command = Command::new(program);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    hide_console(&mut command);

    command.status().map(|s| s.success()).unwrap_or(false)
}

#[cfg(windows)]
pub(crate) fn hide_console(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
pub(crate) fn hide_console(_command: &mut Command) {}
