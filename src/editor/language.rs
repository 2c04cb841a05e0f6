use clap::ValueEnum;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Languages the judge accepts. The lowercase names are the wire values.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    Javascript,
    Java,
    Cpp,
    C,
    Typescript,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::Javascript,
        Language::Java,
        Language::Cpp,
        Language::C,
        Language::Typescript,
    ];

    /// Next language in picker order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Python => "Python 3",
            Language::Javascript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::C => "C",
            Language::Typescript => "TypeScript",
        }
    }
}

/// Editor colour scheme. Names follow the usual editor theme ids.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Theme {
    #[default]
    VsDark,
    Vs,
    HcBlack,
}

/// Colours a theme resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub gutter: Color,
    pub border: Color,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::VsDark => Theme::Vs,
            Theme::Vs => Theme::HcBlack,
            Theme::HcBlack => Theme::VsDark,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::VsDark => Palette {
                background: Color::Rgb(30, 30, 30),
                foreground: Color::Rgb(212, 212, 212),
                gutter: Color::Rgb(133, 133, 133),
                border: Color::DarkGray,
            },
            Theme::Vs => Palette {
                background: Color::Rgb(255, 255, 255),
                foreground: Color::Rgb(0, 0, 0),
                gutter: Color::Rgb(35, 120, 147),
                border: Color::Gray,
            },
            Theme::HcBlack => Palette {
                background: Color::Black,
                foreground: Color::White,
                gutter: Color::White,
                border: Color::Cyan,
            },
        }
    }
}
