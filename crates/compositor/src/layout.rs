//! Figure layout: the panel grid, reserved cells and shared legend band.
//!
//! The grid owns panel placement. Scenario order and row-major cell order
//! are the same ordering by contract, which is what keeps titles and row
//! labels aligned to the correct panel.

use atlas_common::{AtlasError, AtlasResult};

/// A cell's position in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
    pub index: usize,
}

impl GridPosition {
    /// Cells that receive a return-period title.
    pub fn is_first_row(&self) -> bool {
        self.row == 0
    }

    /// Cells that receive a rotated model/period label.
    pub fn is_first_column(&self) -> bool {
        self.col == 0
    }
}

/// Pixel rectangle of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl CellRect {
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }
}

/// What a grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRole {
    /// Panel for the scenario at this index.
    Scenario(usize),
    /// The locator inset showing the full study region.
    Context,
    /// Trailing cell with nothing to show; left blank, no visible axes.
    Hidden,
}

/// Grid geometry for one figure.
#[derive(Debug, Clone)]
pub struct FigureLayout {
    width: u32,
    height: u32,
    rows: usize,
    cols: usize,
    margin_left: f32,
    margin_right: f32,
    margin_top: f32,
    margin_bottom: f32,
    wspace: f32,
    hspace: f32,
    legend_band: f32,
}

impl FigureLayout {
    pub fn new(width: u32, height: u32, rows: usize, cols: usize) -> AtlasResult<Self> {
        if width == 0 || height == 0 || rows == 0 || cols == 0 {
            return Err(AtlasError::Render(format!(
                "degenerate layout: {}x{} px, {}x{} cells",
                width, height, rows, cols
            )));
        }
        Ok(Self {
            width,
            height,
            rows,
            cols,
            margin_left: 48.0,
            margin_right: 12.0,
            margin_top: 28.0,
            margin_bottom: 12.0,
            wspace: 6.0,
            hspace: 10.0,
            legend_band: 0.0,
        })
    }

    pub fn with_margins(mut self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        self.margin_left = left;
        self.margin_right = right;
        self.margin_top = top;
        self.margin_bottom = bottom;
        self
    }

    pub fn with_spacing(mut self, wspace: f32, hspace: f32) -> Self {
        self.wspace = wspace;
        self.hspace = hspace;
        self
    }

    /// Reserve a full-width strip above the bottom margin for the shared
    /// legend/colorbar, outside the panel grid.
    pub fn with_legend_band(mut self, height: f32) -> Self {
        self.legend_band = height;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// The grid invariant: every scenario gets a cell, plus the reserved
    /// non-data cells; anything left over is hidden, never missing.
    pub fn check_alignment(&self, scenario_count: usize, reserved: usize) -> AtlasResult<()> {
        if scenario_count + reserved > self.cell_count() {
            return Err(AtlasError::Render(format!(
                "{} scenarios + {} reserved cells exceed {}x{} grid",
                scenario_count, reserved, self.rows, self.cols
            )));
        }
        Ok(())
    }

    /// Role of the cell at `index` given the scenario count. The context
    /// inset sits immediately after the last scenario cell.
    pub fn role_for(&self, index: usize, scenario_count: usize) -> CellRole {
        if index < scenario_count {
            CellRole::Scenario(index)
        } else if index == scenario_count {
            CellRole::Context
        } else {
            CellRole::Hidden
        }
    }

    pub fn position(&self, index: usize) -> GridPosition {
        GridPosition {
            row: index / self.cols,
            col: index % self.cols,
            index,
        }
    }

    /// Rectangle of the cell at `index`, row-major.
    pub fn cell(&self, index: usize) -> (GridPosition, CellRect) {
        let pos = self.position(index);
        let cell_w = (self.inner_width() - (self.cols - 1) as f32 * self.wspace) / self.cols as f32;
        let cell_h = (self.inner_height() - (self.rows - 1) as f32 * self.hspace) / self.rows as f32;
        let rect = CellRect {
            x: self.margin_left + pos.col as f32 * (cell_w + self.wspace),
            y: self.margin_top + pos.row as f32 * (cell_h + self.hspace),
            w: cell_w,
            h: cell_h,
        };
        (pos, rect)
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = (GridPosition, CellRect)> + '_ {
        (0..self.cell_count()).map(move |i| self.cell(i))
    }

    /// Full-width legend strip between the grid and the bottom margin.
    pub fn legend_rect(&self) -> CellRect {
        CellRect {
            x: self.margin_left,
            y: self.height as f32 - self.margin_bottom - self.legend_band,
            w: self.inner_width(),
            h: self.legend_band,
        }
    }

    fn inner_width(&self) -> f32 {
        self.width as f32 - self.margin_left - self.margin_right
    }

    fn inner_height(&self) -> f32 {
        self.height as f32 - self.margin_top - self.margin_bottom - self.legend_band
    }
}
