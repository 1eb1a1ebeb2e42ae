use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
}

/// How frame previews are drawn into terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  Ascii,
  Direct,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ascii",
      DisplayMode::Direct => "half-block",
    }
  }

  pub fn from_config(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "ascii" => Some(DisplayMode::Ascii),
      "direct" | "half-block" => Some(DisplayMode::Direct),
      _ => None,
    }
  }

  pub fn toggle(self) -> Self {
    match self {
      DisplayMode::Ascii => DisplayMode::Direct,
      DisplayMode::Direct => DisplayMode::Ascii,
    }
  }
}

/// True-color terminals get half-block previews, everything else ASCII.
pub fn detect_display_mode() -> DisplayMode {
  let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
  if colorterm == "truecolor" || colorterm == "24bit" {
    return DisplayMode::Direct;
  }
  DisplayMode::Ascii
}

/// CLI choice wins; `auto` defers to the saved preference, then detection.
pub fn resolve_display_mode(cli: CliDisplayMode, saved: Option<&str>) -> DisplayMode {
  match cli {
    CliDisplayMode::Auto => saved.and_then(DisplayMode::from_config).unwrap_or_else(detect_display_mode),
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_config_accepts_both_spellings() {
    assert_eq!(DisplayMode::from_config("Direct"), Some(DisplayMode::Direct));
    assert_eq!(DisplayMode::from_config("half-block"), Some(DisplayMode::Direct));
    assert_eq!(DisplayMode::from_config("ASCII"), Some(DisplayMode::Ascii));
    assert_eq!(DisplayMode::from_config("kitty"), None);
  }

  #[test]
  fn explicit_cli_mode_ignores_saved() {
    assert_eq!(resolve_display_mode(CliDisplayMode::Ascii, Some("direct")), DisplayMode::Ascii);
    assert_eq!(resolve_display_mode(CliDisplayMode::Auto, Some("direct")), DisplayMode::Direct);
  }
}
