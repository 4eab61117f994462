use serde::{Deserialize, Serialize};

/// Distance from the frame bottom used when a track asks for the default.
pub const DEFAULT_BOTTOM_MARGIN: u32 = 50;
/// Gap left between stacked tracks.
pub const STACK_GAP: u32 = 10;
/// Left/right padding applied around centered and right-aligned text.
const SIDE_PADDING: u32 = 10;

/// Fixed color palette offered to the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Orange,
    Pink,
    Purple,
    Gray,
    LightGray,
    DarkGray,
}

impl NamedColor {
    pub const ALL: [NamedColor; 14] = [
        NamedColor::White,
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Blue,
        NamedColor::Yellow,
        NamedColor::Cyan,
        NamedColor::Magenta,
        NamedColor::Orange,
        NamedColor::Pink,
        NamedColor::Purple,
        NamedColor::Gray,
        NamedColor::LightGray,
        NamedColor::DarkGray,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NamedColor::White => "white",
            NamedColor::Black => "black",
            NamedColor::Red => "red",
            NamedColor::Green => "green",
            NamedColor::Blue => "blue",
            NamedColor::Yellow => "yellow",
            NamedColor::Cyan => "cyan",
            NamedColor::Magenta => "magenta",
            NamedColor::Orange => "orange",
            NamedColor::Pink => "pink",
            NamedColor::Purple => "purple",
            NamedColor::Gray => "gray",
            NamedColor::LightGray => "light_gray",
            NamedColor::DarkGray => "dark_gray",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::White => (0xFF, 0xFF, 0xFF),
            NamedColor::Black => (0x00, 0x00, 0x00),
            NamedColor::Red => (0xFF, 0x00, 0x00),
            NamedColor::Green => (0x00, 0xFF, 0x00),
            NamedColor::Blue => (0x00, 0x00, 0xFF),
            NamedColor::Yellow => (0xFF, 0xFF, 0x00),
            NamedColor::Cyan => (0x00, 0xFF, 0xFF),
            NamedColor::Magenta => (0xFF, 0x00, 0xFF),
            NamedColor::Orange => (0xFF, 0xA5, 0x00),
            NamedColor::Pink => (0xFF, 0xC0, 0xCB),
            NamedColor::Purple => (0x80, 0x00, 0x80),
            NamedColor::Gray => (0x80, 0x80, 0x80),
            NamedColor::LightGray => (0xD3, 0xD3, 0xD3),
            NamedColor::DarkGray => (0x40, 0x40, 0x40),
        }
    }

    /// Renderer-native packed form: BGR byte order, opaque alpha prefix.
    pub fn ass_color(self) -> String {
        let (r, g, b) = self.rgb();
        format!("&H00{:02X}{:02X}{:02X}&", b, g, r)
    }

    /// Packed form for `force_style` filter options (no trailing ampersand).
    pub fn force_style_color(self) -> String {
        let (r, g, b) = self.rgb();
        format!("&H00{:02X}{:02X}{:02X}", b, g, r)
    }
}

/// Horizontal placement of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalPlacement {
    /// Bottom-center with symmetric side padding
    Centered,
    /// Bottom-right with symmetric side padding
    RightAligned,
    /// Bottom-left with an explicit left margin in pixels
    LeftAt(u32),
}

impl HorizontalPlacement {
    /// Host widget convention: -1 centered, -2 right-aligned, any
    /// non-negative value is a left offset in pixels.
    pub fn from_widget(value: i64) -> Self {
        match value {
            -2 => HorizontalPlacement::RightAligned,
            v if v >= 0 => HorizontalPlacement::LeftAt(v as u32),
            _ => HorizontalPlacement::Centered,
        }
    }
}

/// Vertical margin request for one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMargin {
    /// Computed default ([`DEFAULT_BOTTOM_MARGIN`])
    Default,
    /// Explicit distance from the frame bottom in pixels
    Pixels(u32),
    /// Secondary track only: stack above the primary track's text
    AutoStack,
}

impl VerticalMargin {
    /// Host widget convention: -1 default, -2 auto-stack, any non-negative
    /// value is an explicit pixel margin.
    pub fn from_widget(value: i64) -> Self {
        match value {
            -2 => VerticalMargin::AutoStack,
            v if v >= 0 => VerticalMargin::Pixels(v as u32),
            _ => VerticalMargin::Default,
        }
    }
}

/// Per-track rendering parameters as chosen in the host UI.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub font_size: u32,
    pub fill: NamedColor,
    pub outline: NamedColor,
    pub outline_width: u32,
    pub horizontal: HorizontalPlacement,
    pub vertical: VerticalMargin,
}

impl LayoutSpec {
    pub fn primary_default() -> Self {
        Self {
            font_size: 24,
            fill: NamedColor::White,
            outline: NamedColor::Black,
            outline_width: 2,
            horizontal: HorizontalPlacement::Centered,
            vertical: VerticalMargin::Default,
        }
    }

    pub fn secondary_default() -> Self {
        Self {
            font_size: 20,
            fill: NamedColor::Yellow,
            outline: NamedColor::Black,
            outline_width: 2,
            horizontal: HorizontalPlacement::Centered,
            vertical: VerticalMargin::AutoStack,
        }
    }
}

/// ASS numpad alignment, bottom row only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Alignment {
    pub fn code(self) -> u32 {
        match self {
            Alignment::BottomLeft => 1,
            Alignment::BottomCenter => 2,
            Alignment::BottomRight => 3,
        }
    }
}

/// The two style buckets declared in the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleBucket {
    Primary,
    Secondary,
}

impl StyleBucket {
    pub fn style_name(self) -> &'static str {
        match self {
            StyleBucket::Primary => "Primary",
            StyleBucket::Secondary => "Secondary",
        }
    }
}

/// Concrete placement for one track after sentinel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPlacement {
    pub alignment: Alignment,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

/// Both tracks' placements plus the bucket-ordering decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayout {
    pub primary: ResolvedPlacement,
    pub secondary: ResolvedPlacement,
}

impl ResolvedLayout {
    /// Bucket whose text sits closer to the frame bottom: the one with the
    /// numerically smaller vertical margin. Merged events anchor here.
    /// Equal margins keep the primary bucket.
    pub fn lower_bucket(&self) -> StyleBucket {
        if self.secondary.margin_v < self.primary.margin_v {
            StyleBucket::Secondary
        } else {
            StyleBucket::Primary
        }
    }
}

/// Resolve both tracks' sentinels into concrete margins and alignment.
///
/// The secondary track resolves after the primary so auto-stack can read the
/// primary's final margin.
pub fn resolve(primary: &LayoutSpec, secondary: &LayoutSpec) -> ResolvedLayout {
    let primary_margin = match primary.vertical {
        VerticalMargin::Pixels(px) => px,
        // Auto-stack has no meaning for the track being stacked upon;
        // treat it as the default.
        VerticalMargin::Default | VerticalMargin::AutoStack => DEFAULT_BOTTOM_MARGIN,
    };

    let secondary_margin = match secondary.vertical {
        VerticalMargin::Pixels(px) => px,
        VerticalMargin::Default => DEFAULT_BOTTOM_MARGIN,
        VerticalMargin::AutoStack => primary_margin + primary.font_size + STACK_GAP,
    };

    ResolvedLayout {
        primary: place(primary.horizontal, primary_margin),
        secondary: place(secondary.horizontal, secondary_margin),
    }
}

fn place(horizontal: HorizontalPlacement, margin_v: u32) -> ResolvedPlacement {
    match horizontal {
        HorizontalPlacement::Centered => ResolvedPlacement {
            alignment: Alignment::BottomCenter,
            margin_l: SIDE_PADDING,
            margin_r: SIDE_PADDING,
            margin_v,
        },
        HorizontalPlacement::RightAligned => ResolvedPlacement {
            alignment: Alignment::BottomRight,
            margin_l: SIDE_PADDING,
            margin_r: SIDE_PADDING,
            margin_v,
        },
        HorizontalPlacement::LeftAt(offset) => ResolvedPlacement {
            alignment: Alignment::BottomLeft,
            margin_l: offset,
            margin_r: SIDE_PADDING,
            margin_v,
        },
    }
}
