//! Table layout: the cell grid, column widths, row heights and cell
//! placement.
//!
//! Column widths follow the automatic algorithm: each column measures the
//! min-content and max-content widths of its cells, then the width offered
//! to the table is shared out in proportion to those. `table-layout: fixed`
//! uses the widths of the first row instead.
//! Spec: <https://www.w3.org/TR/CSS22/tables.html#width-layout>

use css::{BorderCollapse, ComputedStyle, Dimension, Display, TableLayout, VerticalAlign};

use crate::arena::{BoxGeometry, RenderId, RenderKind};
use crate::block::WidthMode;
use crate::engine::{
    Containing, LayoutEngine, border_edges, clamp_height, content_size, padding_edges,
    resolve_edges,
};
use crate::float::ExclusionSpace;
use crate::geometry::{Edges, Rect};
use crate::intrinsic::Intrinsic;

#[derive(Clone, Copy, Debug)]
struct CellSlot {
    cell: RenderId,
    row: usize,
    column: usize,
    row_span: usize,
    col_span: usize,
}

#[derive(Debug, Default)]
struct Grid {
    captions: Vec<RenderId>,
    groups: Vec<(RenderId, Vec<usize>)>,
    rows: Vec<RenderId>,
    cells: Vec<CellSlot>,
    columns: usize,
}

impl LayoutEngine<'_> {
    fn table_grid(&self, table: RenderId) -> Grid {
        let mut grid = Grid::default();
        // Header groups come first and footer groups last; everything else,
        // loose rows included, keeps document order.
        let mut header = Vec::new();
        let mut body = Vec::new();
        let mut footer = Vec::new();
        for child in self.arena.children(table) {
            let Some(item) = self.item(*child) else {
                continue;
            };
            match (item.kind, item.style.display) {
                (RenderKind::TableCaption, _) => grid.captions.push(*child),
                (RenderKind::TableRowGroup, Display::TableHeaderGroup) => header.push(*child),
                (RenderKind::TableRowGroup, Display::TableFooterGroup) => footer.push(*child),
                (RenderKind::TableRowGroup | RenderKind::TableRow, _) => body.push(*child),
                _ => {}
            }
        }
        for entry in header.into_iter().chain(body).chain(footer) {
            let is_row = self
                .item(entry)
                .is_some_and(|item| item.kind == RenderKind::TableRow);
            if is_row {
                grid.rows.push(entry);
                continue;
            }
            let first = grid.rows.len();
            for row in self.arena.children(entry) {
                if self.item(*row).is_some_and(|item| item.kind == RenderKind::TableRow) {
                    grid.rows.push(*row);
                }
            }
            grid.groups.push((entry, (first..grid.rows.len()).collect()));
        }

        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); grid.rows.len()];
        for (row_index, row) in grid.rows.clone().into_iter().enumerate() {
            let mut column = 0;
            for cell in self.arena.children(row) {
                let Some(item) = self.item(*cell) else {
                    continue;
                };
                if item.kind != RenderKind::TableCell {
                    continue;
                }
                while occupied[row_index].get(column).copied().unwrap_or(false) {
                    column += 1;
                }
                let row_span = item.row_span.min(grid.rows.len() - row_index).max(1);
                let col_span = item.col_span.max(1);
                for spanned_row in occupied.iter_mut().skip(row_index).take(row_span) {
                    if spanned_row.len() < column + col_span {
                        spanned_row.resize(column + col_span, false);
                    }
                    for slot in spanned_row.iter_mut().skip(column).take(col_span) {
                        *slot = true;
                    }
                }
                grid.cells.push(CellSlot {
                    cell: *cell,
                    row: row_index,
                    column,
                    row_span,
                    col_span,
                });
                column += col_span;
                grid.columns = grid.columns.max(column);
            }
        }
        grid
    }

    fn cell_intrinsic(&mut self, cell: RenderId) -> Intrinsic {
        let style = self.style(cell);
        let border = border_edges(&style);
        let padding = padding_edges(&style, 0.0);
        let extra = border.horizontal() + padding.horizontal();
        let content = self.content_intrinsic(cell);
        let max = match style.width {
            Dimension::Px(width) => content_size(&style, width, extra).max(content.min),
            Dimension::Auto | Dimension::Percent(_) => content.max,
        };
        Intrinsic {
            min: content.min + extra,
            max: max.max(content.min) + extra,
        }
    }

    fn column_intrinsics(&mut self, grid: &Grid, spacing: f32) -> Vec<Intrinsic> {
        let mut columns = vec![Intrinsic::default(); grid.columns];
        let mut spanning = Vec::new();
        for slot in &grid.cells {
            let size = self.cell_intrinsic(slot.cell);
            if slot.col_span == 1 {
                if let Some(column) = columns.get_mut(slot.column) {
                    column.min = column.min.max(size.min);
                    column.max = column.max.max(size.max);
                }
            } else {
                spanning.push((*slot, size));
            }
        }
        for (slot, size) in spanning {
            let range = slot.column..(slot.column + slot.col_span).min(grid.columns);
            let count = range.len().max(1) as f32;
            let gaps = spacing * (count - 1.0);
            let min_sum: f32 = columns[range.clone()].iter().map(|column| column.min).sum();
            let max_sum: f32 = columns[range.clone()].iter().map(|column| column.max).sum();
            let min_deficit = (size.min - gaps - min_sum).max(0.0) / count;
            let max_deficit = (size.max - gaps - max_sum).max(0.0) / count;
            for column in &mut columns[range] {
                column.min += min_deficit;
                column.max += max_deficit;
                column.max = column.max.max(column.min);
            }
        }
        columns
    }

    /// Border-box intrinsic widths of a table.
    pub(crate) fn table_intrinsic(&mut self, table: RenderId) -> Intrinsic {
        if let Some(cached) = self.intrinsic_cache.get(&table) {
            return *cached;
        }
        let style = self.style(table);
        let grid = self.table_grid(table);
        let spacing = horizontal_spacing(&style, grid.columns);
        let columns = self.column_intrinsics(&grid, style.border_spacing.0);
        let border = border_edges(&style);
        let padding = padding_edges(&style, 0.0);
        let extra = border.horizontal() + padding.horizontal();
        let mut min = columns.iter().map(|column| column.min).sum::<f32>() + spacing;
        let mut max = columns.iter().map(|column| column.max).sum::<f32>() + spacing;
        for caption in &grid.captions {
            let caption_size = self.outer_intrinsic(*caption);
            min = min.max(caption_size.min);
            max = max.max(caption_size.max);
        }
        if let Dimension::Px(width) = style.width {
            let width = content_size(&style, width, extra);
            min = min.max(width);
            max = width.max(min);
        }
        let result = Intrinsic {
            min: min + extra,
            max: max.max(min) + extra,
        };
        self.intrinsic_cache.insert(table, result);
        result
    }

    /// Lay out a table with its border box top at `top`. Returns the border
    /// box height.
    pub(crate) fn layout_table(&mut self, id: RenderId, cb: Containing, top: f32, mode: WidthMode) -> f32 {
        let style = self.style(id);
        let positioned = style.is_positioned();
        if positioned {
            self.positioned_stack.push(Vec::new());
        }
        let mut margin = resolve_edges(&style.margin, cb.width);
        let border = border_edges(&style);
        let padding = padding_edges(&style, cb.width);
        let extra = border.horizontal() + padding.horizontal();
        let grid = self.table_grid(id);
        let (h_spacing, v_spacing) = if style.border_collapse == BorderCollapse::Collapse {
            (0.0, 0.0)
        } else {
            style.border_spacing
        };
        let spacing_total = horizontal_spacing(&style, grid.columns);
        let columns = self.column_intrinsics(&grid, h_spacing);
        let sum_min: f32 = columns.iter().map(|column| column.min).sum();
        let sum_max: f32 = columns.iter().map(|column| column.max).sum();

        let available = (cb.width - margin.horizontal() - extra).max(0.0);
        let specified = style
            .width
            .resolve(Some(cb.width))
            .map(|width| content_size(&style, width, extra));
        let fixed_layout = style.table_layout == TableLayout::Fixed && specified.is_some();
        let mut content_width = match (specified, mode) {
            (Some(width), _) => width,
            (None, WidthMode::Fill) => available,
            (None, WidthMode::ShrinkToFit) => (sum_max + spacing_total).min(available),
        };
        if !fixed_layout {
            content_width = content_width.max(sum_min + spacing_total);
        }
        let widths = if fixed_layout {
            self.fixed_column_widths(&grid, (content_width - spacing_total).max(0.0))
        } else {
            distribute(&columns, content_width - spacing_total)
        };
        content_width = content_width.max(widths.iter().sum::<f32>() + spacing_total);

        if mode == WidthMode::Fill {
            let free = cb.width - content_width - extra - margin.horizontal();
            match (style.margin.left.is_auto(), style.margin.right.is_auto()) {
                (true, true) => {
                    margin.left = (free / 2.0).max(0.0);
                    margin.right = free - margin.left;
                }
                (true, false) => margin.left = free,
                _ => {}
            }
        }
        let x = cb.x + margin.left;
        let content_x = x + border.left + padding.left;
        let content_top = top + border.top + padding.top;
        self.set_geometry(
            id,
            BoxGeometry {
                border_box: Rect::new(x, top, content_width + extra, 0.0),
                margin,
                border,
                padding,
            },
        );

        let mut y = content_top;
        for caption in &grid.captions {
            let caption_cb = Containing {
                x: content_x,
                width: content_width,
                height: None,
            };
            let plan = self.plan_box(*caption, caption_cb, WidthMode::Fill);
            let caption_top = y + plan.margin.top;
            let mut scratch = ExclusionSpace::new();
            let outcome = self.layout_container(
                *caption,
                &plan,
                caption_cb,
                content_x + plan.margin.left,
                caption_top,
                &mut scratch,
                false,
                true,
            );
            y = caption_top + outcome.height + plan.margin.bottom;
        }

        let mut column_x = Vec::with_capacity(widths.len());
        let mut cursor = content_x + h_spacing;
        for width in &widths {
            column_x.push(cursor);
            cursor += width + h_spacing;
        }
        let span_width = |slot: &CellSlot| {
            let end = (slot.column + slot.col_span).min(widths.len());
            widths[slot.column.min(end)..end].iter().sum::<f32>()
                + h_spacing * (slot.col_span.saturating_sub(1)) as f32
        };

        // Cells are laid out at y = 0 first; rows are stacked once their
        // heights are known.
        let mut cell_heights = Vec::with_capacity(grid.cells.len());
        for slot in &grid.cells {
            let width = span_width(slot);
            let cell_x = column_x.get(slot.column).copied().unwrap_or(content_x);
            let cell_cb = Containing {
                x: cell_x,
                width,
                height: None,
            };
            let mut plan = self.plan_box(slot.cell, cell_cb, WidthMode::Fill);
            plan.margin = Edges::default();
            plan.content_width =
                (width - plan.border.horizontal() - plan.padding.horizontal()).max(0.0);
            let mut scratch = ExclusionSpace::new();
            let outcome =
                self.layout_container(slot.cell, &plan, cell_cb, cell_x, 0.0, &mut scratch, false, true);
            cell_heights.push(outcome.height);
        }

        let mut row_heights: Vec<f32> = grid
            .rows
            .iter()
            .map(|row| {
                self.item(*row)
                    .and_then(|item| item.style.height.resolve(None))
                    .unwrap_or(0.0)
            })
            .collect();
        for (slot, height) in grid.cells.iter().zip(&cell_heights) {
            if slot.row_span == 1
                && let Some(row) = row_heights.get_mut(slot.row)
            {
                *row = row.max(*height);
            }
        }
        for (slot, height) in grid.cells.iter().zip(&cell_heights) {
            if slot.row_span > 1 {
                let end = slot.row + slot.row_span;
                let spanned: f32 = row_heights[slot.row..end].iter().sum::<f32>()
                    + v_spacing * (slot.row_span - 1) as f32;
                if *height > spanned {
                    row_heights[end - 1] += height - spanned;
                }
            }
        }

        if !grid.rows.is_empty() {
            y += v_spacing;
        }
        let mut row_tops = Vec::with_capacity(grid.rows.len());
        for (row, height) in grid.rows.iter().zip(&row_heights) {
            row_tops.push(y);
            if let Some(item) = self.arena.get_mut(*row) {
                item.geometry.border_box = Rect::new(content_x, y, content_width, *height);
            }
            y += height + v_spacing;
        }

        for (slot, laid_out) in grid.cells.iter().zip(&cell_heights) {
            let end = slot.row + slot.row_span;
            let height = row_heights[slot.row..end].iter().sum::<f32>()
                + v_spacing * (slot.row_span - 1) as f32;
            let row_top = row_tops.get(slot.row).copied().unwrap_or(y);
            self.arena.translate_subtree(slot.cell, 0.0, row_top);
            let slack = (height - laid_out).max(0.0);
            let align = self.style(slot.cell).vertical_align;
            let offset = match align {
                VerticalAlign::Middle => slack / 2.0,
                VerticalAlign::Bottom => slack,
                _ => 0.0,
            };
            self.shift_contents(slot.cell, offset);
            if let Some(item) = self.arena.get_mut(slot.cell) {
                item.geometry.border_box.height = height;
            }
        }

        for (group, rows) in &grid.groups {
            let rect = rows
                .iter()
                .filter_map(|row| self.item(grid.rows[*row]).map(|item| item.geometry.border_box))
                .reduce(|acc, rect| acc.union(&rect))
                .unwrap_or_else(|| Rect::new(content_x, y, content_width, 0.0));
            if let Some(item) = self.arena.get_mut(*group) {
                item.geometry.border_box = rect;
            }
        }

        let extra_vertical = border.vertical() + padding.vertical();
        let auto_height = (y - content_top).max(0.0);
        let content_height = style
            .height
            .resolve(cb.height)
            .map_or(auto_height, |height| content_size(&style, height, extra_vertical).max(auto_height));
        let content_height = clamp_height(&style, content_height, cb.height, extra_vertical);
        let height = content_height + extra_vertical;
        if let Some(item) = self.arena.get_mut(id) {
            item.geometry.border_box.height = height;
        }
        log::trace!("table {} columns, widths {widths:?}", grid.columns);
        if positioned {
            self.finish_positioned(id, cb);
        }
        height
    }

    /// Move the content of a cell without moving the cell box.
    fn shift_contents(&mut self, cell: RenderId, offset: f32) {
        if offset == 0.0 {
            return;
        }
        for child in self.children(cell) {
            self.arena.translate_subtree(child, 0.0, offset);
        }
        if let Some(item) = self.arena.get_mut(cell) {
            for line in &mut item.lines {
                line.rect = line.rect.translated(0.0, offset);
                line.baseline += offset;
            }
        }
    }

    /// `table-layout: fixed`: widths of the first row's cells, the rest of
    /// the table width split equally between columns without one.
    fn fixed_column_widths(&mut self, grid: &Grid, target: f32) -> Vec<f32> {
        let mut widths: Vec<Option<f32>> = vec![None; grid.columns];
        for slot in grid.cells.iter().filter(|slot| slot.row == 0) {
            let style = self.style(slot.cell);
            let Dimension::Px(width) = style.width else {
                continue;
            };
            let border = border_edges(&style);
            let padding = padding_edges(&style, target);
            let extra = border.horizontal() + padding.horizontal();
            let share = (content_size(&style, width, extra) + extra) / slot.col_span as f32;
            for column in widths.iter_mut().skip(slot.column).take(slot.col_span) {
                *column = Some(share);
            }
        }
        let assigned: f32 = widths.iter().flatten().sum();
        let unassigned = widths.iter().filter(|width| width.is_none()).count();
        let remainder = (target - assigned).max(0.0);
        if unassigned == 0 {
            let bonus = if widths.is_empty() {
                0.0
            } else {
                remainder / widths.len() as f32
            };
            return widths.into_iter().map(|width| width.unwrap_or(0.0) + bonus).collect();
        }
        let share = remainder / unassigned as f32;
        widths
            .into_iter()
            .map(|width| width.unwrap_or(share))
            .collect()
    }
}

fn horizontal_spacing(style: &ComputedStyle, columns: usize) -> f32 {
    if style.border_collapse == BorderCollapse::Collapse {
        return 0.0;
    }
    style.border_spacing.0 * (columns + 1) as f32
}

/// Share `target` between columns: proportionally to max-content widths
/// above the preferred total, interpolated between min and max below it,
/// and never under the min-content widths.
pub(crate) fn distribute(columns: &[Intrinsic], target: f32) -> Vec<f32> {
    let sum_min: f32 = columns.iter().map(|column| column.min).sum();
    let sum_max: f32 = columns.iter().map(|column| column.max).sum();
    if columns.is_empty() {
        return Vec::new();
    }
    if target >= sum_max {
        let excess = target - sum_max;
        if sum_max > 0.0 {
            return columns
                .iter()
                .map(|column| column.max + excess * column.max / sum_max)
                .collect();
        }
        let share = excess / columns.len() as f32;
        return columns.iter().map(|column| column.max + share).collect();
    }
    if target > sum_min && sum_max > sum_min {
        let ratio = (target - sum_min) / (sum_max - sum_min);
        return columns
            .iter()
            .map(|column| column.min + (column.max - column.min) * ratio)
            .collect();
    }
    columns.iter().map(|column| column.min).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(min: f32, max: f32) -> Intrinsic {
        Intrinsic { min, max }
    }

    #[test]
    fn excess_follows_preferred_widths() {
        let widths = distribute(&[column(40.0, 40.0), column(60.0, 60.0)], 200.0);
        assert_eq!(widths, vec![80.0, 120.0]);
    }

    #[test]
    fn deficit_interpolates_between_min_and_max() {
        let widths = distribute(&[column(10.0, 50.0), column(10.0, 30.0)], 50.0);
        assert_eq!(widths, vec![30.0, 20.0]);
    }

    #[test]
    fn below_minimum_keeps_minimums() {
        let widths = distribute(&[column(30.0, 50.0), column(20.0, 30.0)], 10.0);
        assert_eq!(widths, vec![30.0, 20.0]);
    }
}
