use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  pub positive: Color,
  pub negative: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Slate",
    bg: Color::Rgb(24, 26, 32),
    fg: Color::Rgb(220, 223, 228),
    accent: Color::Rgb(97, 175, 239),
    muted: Color::Rgb(120, 128, 140),
    border: Color::Rgb(60, 66, 78),
    highlight_fg: Color::Rgb(24, 26, 32),
    highlight_bg: Color::Rgb(97, 175, 239),
    stripe_bg: Color::Rgb(30, 33, 40),
    status: Color::Rgb(229, 192, 123),
    error: Color::Rgb(224, 108, 117),
    key_fg: Color::Rgb(24, 26, 32),
    key_bg: Color::Rgb(120, 128, 140),
    positive: Color::Rgb(152, 195, 121),
    negative: Color::Rgb(224, 108, 117),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 248, 242),
    fg: Color::Rgb(50, 50, 50),
    accent: Color::Rgb(38, 110, 170),
    muted: Color::Rgb(140, 140, 135),
    border: Color::Rgb(200, 198, 190),
    highlight_fg: Color::Rgb(250, 248, 242),
    highlight_bg: Color::Rgb(38, 110, 170),
    stripe_bg: Color::Rgb(242, 240, 232),
    status: Color::Rgb(170, 120, 20),
    error: Color::Rgb(190, 50, 50),
    key_fg: Color::Rgb(250, 248, 242),
    key_bg: Color::Rgb(140, 140, 135),
    positive: Color::Rgb(60, 140, 60),
    negative: Color::Rgb(190, 50, 50),
  },
  Theme {
    name: "Mono",
    bg: Color::Reset,
    fg: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Cyan,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
    positive: Color::Green,
    negative: Color::Red,
  },
];
