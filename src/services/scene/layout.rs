//! 瀑布式布局
//!
//! 内容块自上而下依次排列。新块放不下时，所有可见块整体上移，
//! 越过标题下边界的块被移除，因此画面上同时存在的块数有上限。
//! 高度是估算值，场景程序在运行时会把实际高度缩放到估算值以内。

use crate::config::LayoutGeometry;

/// 一个已放置的内容块
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBlock {
    pub id: usize,
    pub top: f64,
    pub bottom: f64,
}

/// 布局操作，由场景构建器翻译成动画
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOp {
    /// 可见块整体上移 `shift`，随后移除 `discarded`
    Scroll {
        shift: f64,
        moved: Vec<usize>,
        discarded: Vec<usize>,
    },
    /// 把块放到指定中心高度
    Place { id: usize, center_y: f64 },
}

/// 瀑布布局状态
pub struct WaterfallLayout {
    geometry: LayoutGeometry,
    visible: Vec<PlacedBlock>,
    /// 下一个块的上沿
    cursor: f64,
}

impl WaterfallLayout {
    pub fn new(geometry: LayoutGeometry) -> Self {
        let cursor = geometry.title_boundary - geometry.margin;
        Self {
            geometry,
            visible: Vec::new(),
            cursor,
        }
    }

    /// 单个块允许的最大高度
    pub fn max_block_height(&self) -> f64 {
        let g = &self.geometry;
        (g.title_boundary - g.visible_bottom - 2.0 * g.margin).max(0.1)
    }

    /// 放入一个块，返回需要执行的布局操作
    pub fn push(&mut self, id: usize, height: f64) -> Vec<LayoutOp> {
        let g = &self.geometry;
        let height = height.clamp(0.1, self.max_block_height());
        let mut ops = Vec::new();

        if self.cursor - height < g.visible_bottom {
            // 上移量：新块高度加间距，但游标不能越过标题下方的起始位置
            let ceiling = g.title_boundary - g.margin;
            let shift = (height + g.margin).min(ceiling - self.cursor);

            let moved: Vec<usize> = self.visible.iter().map(|b| b.id).collect();
            for block in &mut self.visible {
                block.top += shift;
                block.bottom += shift;
            }
            self.cursor += shift;

            let boundary = g.title_boundary;
            let discarded: Vec<usize> = self
                .visible
                .iter()
                .filter(|b| b.top > boundary + 1e-9)
                .map(|b| b.id)
                .collect();
            self.visible.retain(|b| b.top <= boundary + 1e-9);

            ops.push(LayoutOp::Scroll {
                shift,
                moved,
                discarded,
            });
        }

        let top = self.cursor;
        let bottom = top - height;
        self.visible.push(PlacedBlock { id, top, bottom });
        self.cursor = bottom - g.margin;

        ops.push(LayoutOp::Place {
            id,
            center_y: top - height / 2.0,
        });
        ops
    }

    pub fn visible(&self) -> &[PlacedBlock] {
        &self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_bounds(layout: &WaterfallLayout, g: &LayoutGeometry) {
        for block in layout.visible() {
            assert!(block.top <= g.title_boundary + 1e-9, "{:?} above title", block);
            assert!(block.bottom >= g.visible_bottom - 1e-9, "{:?} below bottom", block);
        }
    }

    #[test]
    fn test_first_blocks_stack_downward() {
        let g = LayoutGeometry::default();
        let mut layout = WaterfallLayout::new(g.clone());

        let ops = layout.push(0, 0.5);
        assert_eq!(ops.len(), 1);
        let ops = layout.push(1, 0.8);
        match &ops[0] {
            LayoutOp::Place { id, center_y } => {
                assert_eq!(*id, 1);
                // 2.8 - 0.25 - 0.5 - 0.25 - 0.4
                assert!((center_y - 1.4).abs() < 1e-9);
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_overflow_scrolls_and_discards() {
        let g = LayoutGeometry::default();
        let mut layout = WaterfallLayout::new(g.clone());

        let mut saw_scroll = false;
        let mut saw_discard = false;
        for id in 0..12 {
            for op in layout.push(id, 0.8) {
                if let LayoutOp::Scroll { discarded, .. } = op {
                    saw_scroll = true;
                    saw_discard |= !discarded.is_empty();
                }
            }
            assert_in_bounds(&layout, &g);
        }
        assert!(saw_scroll);
        assert!(saw_discard);
    }

    #[test]
    fn test_clutter_stays_bounded_for_long_solutions() {
        let g = LayoutGeometry::default();
        let mut layout = WaterfallLayout::new(g.clone());

        let heights = [0.5, 0.8, 0.8, 1.0, 0.5, 2.4, 0.5, 6.0];
        let mut max_visible = 0;
        for id in 0..30 * 3 {
            layout.push(id, heights[id % heights.len()]);
            assert_in_bounds(&layout, &g);
            max_visible = max_visible.max(layout.visible().len());
        }
        // 可视区域高 5.4，最小块 0.5 + 间距 0.25
        assert!(max_visible <= 8);
    }

    #[test]
    fn test_oversized_block_is_clamped() {
        let g = LayoutGeometry::default();
        let mut layout = WaterfallLayout::new(g.clone());
        layout.push(0, 100.0);
        assert_in_bounds(&layout, &g);
        layout.push(1, 100.0);
        assert_in_bounds(&layout, &g);
        assert_eq!(layout.visible().len(), 1);
    }
}
