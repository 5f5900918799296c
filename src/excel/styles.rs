//! Cell styles used by the exported sheets and their legend.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

/// Fill and font colours, as `0xRRGGBB`.
pub mod palette {
    pub const WHITE: u32 = 0xFFFFFF;
    pub const BLACK: u32 = 0x000000;
    pub const HEADER: u32 = 0x3B3B3B;
    pub const HEADER_TYPE_FIELD: u32 = 0xC2E1D3;
    pub const CELL_LOCKED: u32 = 0xDCDCDC;
    pub const COL_ELEMENT_TYPE: u32 = 0xBAEDFF;
    pub const TYPE_FORMULA: u32 = 0xE19E20;
    pub const LEVEL_1: u32 = 0x8F8F8F;
    pub const LEVEL_2: u32 = 0xC7C7C7;
    pub const TOTAL: u32 = 0x4D4B4B;
    pub const COLUMN_TITLE: u32 = 0x3D3D3D;
}

/// Visual attributes of one cell. Cells are locked unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellStyle {
    pub fill: Option<u32>,
    pub font: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub locked: bool,
    pub centered: bool,
    pub wrap: bool,
    pub border: bool,
    pub num_format: Option<String>,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            fill: None,
            font: None,
            bold: false,
            italic: false,
            locked: true,
            centered: false,
            wrap: false,
            border: true,
            num_format: None,
        }
    }
}

impl CellStyle {
    fn filled(fill: u32, font: u32) -> Self {
        Self {
            fill: Some(fill),
            font: Some(font),
            ..Self::default()
        }
    }

    /// Column headings: the only header row users may edit.
    pub fn header() -> Self {
        Self::filled(palette::HEADER, palette::WHITE).bold().unlocked()
    }

    /// Value-kind row under the headings.
    pub fn header_type_field() -> Self {
        Self {
            italic: true,
            ..Self::filled(palette::HEADER_TYPE_FIELD, palette::BLACK)
        }
    }

    pub fn cell_locked() -> Self {
        Self::filled(palette::CELL_LOCKED, palette::BLACK)
    }

    pub fn cell_unlocked() -> Self {
        Self::filled(palette::WHITE, palette::BLACK).unlocked()
    }

    /// Type-level column: rows pointing at the canonical cell.
    pub fn element_type() -> Self {
        Self::filled(palette::COL_ELEMENT_TYPE, palette::BLACK)
    }

    pub fn formula() -> Self {
        Self::filled(palette::TYPE_FORMULA, palette::BLACK)
    }

    /// Subtotal row; levels past the second share its look.
    pub fn subtotal(level: usize) -> Self {
        if level <= 1 {
            Self::filled(palette::LEVEL_1, palette::WHITE).bold()
        } else {
            Self::filled(palette::LEVEL_2, palette::BLACK)
        }
    }

    pub fn total() -> Self {
        Self::filled(palette::TOTAL, palette::WHITE).bold()
    }

    /// Banner closing a sheet that cannot be imported.
    pub fn banner() -> Self {
        Self {
            centered: true,
            ..Self::filled(palette::BLACK, palette::WHITE).bold()
        }
    }

    /// Merged warning under sheets with formula columns.
    pub fn formula_warning() -> Self {
        Self {
            centered: true,
            wrap: true,
            ..Self::formula().bold()
        }
    }

    pub fn legend_title() -> Self {
        Self {
            centered: true,
            ..Self::filled(palette::BLACK, palette::WHITE).bold()
        }
    }

    pub fn column_title() -> Self {
        Self::filled(palette::COLUMN_TITLE, palette::WHITE).bold()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn unlocked(mut self) -> Self {
        self.locked = false;
        self
    }

    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    pub fn with_num_format(mut self, num_format: Option<&str>) -> Self {
        self.num_format = num_format.map(str::to_string);
        self
    }

    pub fn to_format(&self) -> Format {
        let mut format = Format::new();
        if let Some(fill) = self.fill {
            format = format.set_background_color(Color::RGB(fill));
        }
        if let Some(font) = self.font {
            format = format.set_font_color(Color::RGB(font));
        }
        if self.bold {
            format = format.set_bold();
        }
        if self.italic {
            format = format.set_italic();
        }
        if !self.locked {
            format = format.set_unlocked();
        }
        if self.centered {
            format = format.set_align(FormatAlign::Center);
        }
        if self.wrap {
            format = format.set_text_wrap();
        }
        if self.border {
            format = format.set_border(FormatBorder::Thin);
        }
        if let Some(num_format) = &self.num_format {
            format = format.set_num_format(num_format);
        }
        format
    }
}
