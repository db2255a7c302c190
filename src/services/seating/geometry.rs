//! 座位表几何运算：网格吸附、拖动、八向缩放与旋转
//!
//! 坐标原点在画布左上角。座位组和设施存储的是未旋转时的左上角，
//! 旋转 90/270 度后视觉包围盒宽高互换，并绕中心保持不动。

use crate::models::seating::entities::RoomElement;

/// 座位组占用的网格数（宽 4 格、高 2 格，2x2 张课桌）
pub const GROUP_WIDTH_CELLS: f64 = 4.0;
pub const GROUP_HEIGHT_CELLS: f64 = 2.0;

pub fn snap_to_grid(value: f64, grid_size: f64, enabled: bool) -> f64 {
    if !enabled || grid_size <= 0.0 {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// 吸附开关：座位表设置与临时按住的修饰键共同决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapMode {
    pub chart_enabled: bool,
    pub modifier_held: bool,
}

impl SnapMode {
    pub fn new(chart_enabled: bool, modifier_held: bool) -> Self {
        Self {
            chart_enabled,
            modifier_held,
        }
    }

    pub fn is_active(&self) -> bool {
        self.chart_enabled && !self.modifier_held
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

pub fn group_size(grid_size: f64) -> Size {
    Size {
        width: grid_size * GROUP_WIDTH_CELLS,
        height: grid_size * GROUP_HEIGHT_CELLS,
    }
}

pub fn element_rect(element: &RoomElement) -> Rect {
    Rect {
        x: element.x,
        y: element.y,
        width: element.width,
        height: element.height,
    }
}

/// 旋转角规范到 0/90/180/270
pub fn normalize_rotation(rotation: i32) -> i32 {
    let snapped = ((f64::from(rotation) / 90.0).round() as i32) * 90;
    snapped.rem_euclid(360)
}

pub fn next_rotation(rotation: i32) -> i32 {
    (normalize_rotation(rotation) + 90) % 360
}

pub fn is_portrait(rotation: i32) -> bool {
    matches!(normalize_rotation(rotation), 90 | 270)
}

/// 竖向旋转时存储左上角与视觉左上角之间的偏移
fn centering_offset(size: Size, rotation: i32) -> Point {
    if is_portrait(rotation) {
        Point {
            x: (size.width - size.height) / 2.0,
            y: (size.height - size.width) / 2.0,
        }
    } else {
        Point { x: 0.0, y: 0.0 }
    }
}

/// 旋转后的视觉包围盒
pub fn visual_bounds(stored: Point, size: Size, rotation: i32) -> Rect {
    let offset = centering_offset(size, rotation);
    let (width, height) = if is_portrait(rotation) {
        (size.height, size.width)
    } else {
        (size.width, size.height)
    };
    Rect {
        x: stored.x + offset.x,
        y: stored.y + offset.y,
        width,
        height,
    }
}

/// 由视觉左上角换算回存储位置
pub fn stored_origin(visual: Point, size: Size, rotation: i32) -> Point {
    let offset = centering_offset(size, rotation);
    Point {
        x: visual.x - offset.x,
        y: visual.y - offset.y,
    }
}

/// 把视觉包围盒限制在画布内，返回视觉左上角
pub fn clamp_to_canvas(visual: Rect, canvas: Size) -> Point {
    let max_x = (canvas.width - visual.width).max(0.0);
    let max_y = (canvas.height - visual.height).max(0.0);
    Point {
        x: visual.x.clamp(0.0, max_x),
        y: visual.y.clamp(0.0, max_y),
    }
}

/// 一次拖动
///
/// 拖动过程中返回未吸附的视觉位置，预览与提交时才吸附。
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    origin: Point,
    size: Size,
    rotation: i32,
    canvas: Size,
    grid_size: f64,
}

impl DragSession {
    pub fn start(origin: Point, size: Size, rotation: i32, canvas: Size, grid_size: f64) -> Self {
        Self {
            origin,
            size,
            rotation,
            canvas,
            grid_size,
        }
    }

    /// 指针位移 (dx, dy) 后的视觉左上角
    pub fn position(&self, dx: f64, dy: f64) -> Point {
        let visual = visual_bounds(self.origin, self.size, self.rotation);
        Point {
            x: visual.x + dx,
            y: visual.y + dy,
        }
    }

    pub fn snap_preview(&self, dx: f64, dy: f64, mode: SnapMode) -> Point {
        let raw = self.position(dx, dy);
        Point {
            x: snap_to_grid(raw.x, self.grid_size, mode.is_active()),
            y: snap_to_grid(raw.y, self.grid_size, mode.is_active()),
        }
    }

    /// 提交拖动：吸附、限制在画布内并换算为存储位置
    pub fn commit(&self, dx: f64, dy: f64, mode: SnapMode) -> Point {
        self.commit_visual(self.snap_preview(dx, dy, mode))
    }

    /// 以绝对视觉位置提交
    pub fn commit_at(&self, visual: Point, mode: SnapMode) -> Point {
        let current = visual_bounds(self.origin, self.size, self.rotation);
        self.commit(visual.x - current.x, visual.y - current.y, mode)
    }

    fn commit_visual(&self, snapped: Point) -> Point {
        let bounds = visual_bounds(self.origin, self.size, self.rotation);
        let clamped = clamp_to_canvas(
            Rect {
                x: snapped.x,
                y: snapped.y,
                ..bounds
            },
            self.canvas,
        );
        stored_origin(clamped, self.size, self.rotation)
    }
}

/// 缩放手柄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeHandle {
    fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }
}

impl std::str::FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" => Ok(Self::N),
            "s" => Ok(Self::S),
            "e" => Ok(Self::E),
            "w" => Ok(Self::W),
            "ne" => Ok(Self::NE),
            "nw" => Ok(Self::NW),
            "se" => Ok(Self::SE),
            "sw" => Ok(Self::SW),
            _ => Err(format!("Invalid resize handle: {s}")),
        }
    }
}

/// 按手柄与指针位移计算新的矩形
///
/// 宽高各自吸附，最小为一个网格，拖动边的对边保持不动。
pub fn resize(start: Rect, handle: ResizeHandle, dx: f64, dy: f64, grid_size: f64, snap: bool) -> Rect {
    let min = if grid_size > 0.0 { grid_size } else { 1.0 };
    let mut rect = start;

    if handle.moves_east() || handle.moves_west() {
        let raw = if handle.moves_east() {
            start.width + dx
        } else {
            start.width - dx
        };
        rect.width = snap_to_grid(raw, grid_size, snap).max(min);
        if handle.moves_west() {
            rect.x = start.right() - rect.width;
        }
    }

    if handle.moves_north() || handle.moves_south() {
        let raw = if handle.moves_south() {
            start.height + dy
        } else {
            start.height - dy
        };
        rect.height = snap_to_grid(raw, grid_size, snap).max(min);
        if handle.moves_north() {
            rect.y = start.bottom() - rect.height;
        }
    }

    rect
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Size = Size {
        width: 1600.0,
        height: 1200.0,
    };

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(47.0, 40.0, true), 40.0);
        assert_eq!(snap_to_grid(47.0, 40.0, false), 47.0);
        assert_eq!(snap_to_grid(61.0, 40.0, true), 80.0);
        assert_eq!(snap_to_grid(-19.0, 40.0, true), 0.0);
        assert_eq!(snap_to_grid(13.0, 0.0, true), 13.0);
    }

    #[test]
    fn test_modifier_disables_snap() {
        assert!(SnapMode::new(true, false).is_active());
        assert!(!SnapMode::new(true, true).is_active());
        assert!(!SnapMode::new(false, false).is_active());
    }

    #[test]
    fn test_four_rotations_return_to_start() {
        for start in [0, 90, 180, 270] {
            let mut r = start;
            for _ in 0..4 {
                r = next_rotation(r);
            }
            assert_eq!(r, start);
        }
        assert_eq!(next_rotation(270), 0);
        assert_eq!(normalize_rotation(-90), 270);
    }

    #[test]
    fn test_portrait_centering_keeps_center() {
        let size = group_size(40.0);
        let stored = Point { x: 200.0, y: 200.0 };
        let flat = visual_bounds(stored, size, 0);
        let tall = visual_bounds(stored, size, 90);
        assert_eq!((tall.width, tall.height), (80.0, 160.0));
        assert_eq!(flat.x + flat.width / 2.0, tall.x + tall.width / 2.0);
        assert_eq!(flat.y + flat.height / 2.0, tall.y + tall.height / 2.0);
        assert_eq!(stored_origin(Point { x: tall.x, y: tall.y }, size, 90), stored);
    }

    #[test]
    fn test_drag_raw_then_snapped_commit() {
        let size = group_size(40.0);
        let drag = DragSession::start(Point { x: 40.0, y: 40.0 }, size, 0, CANVAS, 40.0);
        assert_eq!(drag.position(7.0, 3.0), Point { x: 47.0, y: 43.0 });
        assert_eq!(
            drag.commit(7.0, 3.0, SnapMode::new(true, false)),
            Point { x: 40.0, y: 40.0 }
        );
        assert_eq!(
            drag.commit(7.0, 3.0, SnapMode::new(true, true)),
            Point { x: 47.0, y: 43.0 }
        );
    }

    #[test]
    fn test_drag_clamps_to_canvas() {
        let size = group_size(40.0);
        let drag = DragSession::start(Point { x: 0.0, y: 0.0 }, size, 0, CANVAS, 40.0);
        let committed = drag.commit(5000.0, -300.0, SnapMode::new(true, false));
        assert_eq!(committed, Point { x: 1440.0, y: 0.0 });
    }

    #[test]
    fn test_resize_handles_anchor_opposite_edges() {
        let start = Rect {
            x: 80.0,
            y: 80.0,
            width: 80.0,
            height: 40.0,
        };

        let se = resize(start, ResizeHandle::SE, 35.0, 10.0, 40.0, true);
        assert_eq!((se.x, se.y, se.width, se.height), (80.0, 80.0, 120.0, 40.0));

        let nw = resize(start, ResizeHandle::NW, -40.0, -45.0, 40.0, true);
        assert_eq!(nw.right(), start.right());
        assert_eq!(nw.bottom(), start.bottom());
        assert_eq!((nw.width, nw.height), (120.0, 80.0));

        let n = resize(start, ResizeHandle::N, 100.0, 100.0, 40.0, true);
        assert_eq!(n.width, start.width);
        assert_eq!(n.height, 40.0);
        assert_eq!(n.bottom(), start.bottom());
    }

    #[test]
    fn test_resize_minimum_is_one_cell() {
        let start = Rect {
            x: 0.0,
            y: 0.0,
            width: 80.0,
            height: 80.0,
        };
        let w = resize(start, ResizeHandle::W, 500.0, 0.0, 40.0, true);
        assert_eq!(w.width, 40.0);
        assert_eq!(w.right(), 80.0);

        let free = resize(start, ResizeHandle::E, 13.0, 0.0, 40.0, false);
        assert_eq!(free.width, 93.0);
    }

    #[test]
    fn test_handle_parse() {
        assert_eq!("ne".parse::<ResizeHandle>().unwrap(), ResizeHandle::NE);
        assert_eq!("SW".parse::<ResizeHandle>().unwrap(), ResizeHandle::SW);
        assert!("up".parse::<ResizeHandle>().is_err());
    }
}
