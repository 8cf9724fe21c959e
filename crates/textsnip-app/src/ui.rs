use textsnip_config::ui::UiConfig;
use textsnip_ui::UiBridge;

/// Runs on the main thread; returns after a `Quit` command.
pub fn ui_loop(config: &UiConfig, bridge: UiBridge) -> anyhow::Result<()> {
    textsnip_ui::ui_loop(config, bridge)
}
