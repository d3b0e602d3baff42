//! 几何示意图
//!
//! 题干涉及几何图形时，概念场景在画面右侧画一个示意图，文字区相应收窄。

use crate::services::scene::emitter::PyEmitter;
use once_cell::sync::Lazy;
use regex::Regex;

static GEOMETRY_TERMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)三角形|矩形|长方形|正方形|圆|面积|周长|体积|角度|边长|底边|高|勾股|\b(?:triangle|rectangle|square|circle|area|perimeter|volume|angle|hypotenuse|pythagorean)s?\b",
    )
    .unwrap()
});

static TRIANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)三角形|勾股|\b(?:triangles?|hypotenuse|pythagorean)\b").unwrap());
static RECTANGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)矩形|长方形|\brectangles?\b").unwrap());
static SQUARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)正方形|\bsquares?\b").unwrap());
static CIRCLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)圆|\bcircles?\b").unwrap());

/// 示意图及其原始尺寸（渲染时再整体缩放到右侧面板内）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Graphic {
    /// 直角三角形，直角在右下
    Triangle { base: f64, height: f64 },
    Rectangle { width: f64, height: f64 },
    Square { side: f64 },
    Circle { radius: f64 },
}

impl Graphic {
    /// 从题干判断是否需要示意图
    ///
    /// 不是几何题时返回 `None`；是几何题但认不出具体图形时画三角形。
    pub fn detect(question: &str) -> Option<Self> {
        if !GEOMETRY_TERMS.is_match(question) {
            return None;
        }
        let graphic = if TRIANGLE.is_match(question) {
            Graphic::Triangle {
                base: 8.0,
                height: 6.0,
            }
        } else if RECTANGLE.is_match(question) {
            Graphic::Rectangle {
                width: 10.0,
                height: 6.0,
            }
        } else if SQUARE.is_match(question) {
            Graphic::Square { side: 8.0 }
        } else if CIRCLE.is_match(question) {
            Graphic::Circle { radius: 5.0 }
        } else {
            Graphic::Triangle {
                base: 8.0,
                height: 6.0,
            }
        };
        Some(graphic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Graphic::Triangle { .. } => "triangle",
            Graphic::Rectangle { .. } => "rectangle",
            Graphic::Square { .. } => "square",
            Graphic::Circle { .. } => "circle",
        }
    }

    /// 声明图形并缩放到面板内，居中放在 `(center_x, center_y)`
    pub fn emit(
        &self,
        program: &mut PyEmitter,
        var: &str,
        max_width: f64,
        max_height: f64,
        center: (f64, f64),
    ) {
        let declaration = match *self {
            Graphic::Triangle { base, height } => format!(
                "{} = Polygon(ORIGIN, RIGHT * {:.2}, RIGHT * {:.2} + UP * {:.2}, color=BLUE)",
                var, base, base, height
            ),
            Graphic::Rectangle { width, height } => format!(
                "{} = Rectangle(width={:.2}, height={:.2}, color=GREEN)",
                var, width, height
            ),
            Graphic::Square { side } => {
                format!("{} = Square(side_length={:.2}, color=ORANGE)", var, side)
            }
            Graphic::Circle { radius } => {
                format!("{} = Circle(radius={:.2}, color=PURPLE)", var, radius)
            }
        };
        program.line(declaration);
        program.line(format!("{}.set_fill(opacity=0.2)", var));
        program.line(format!("if {}.width > {:.2}:", var, max_width));
        program.indent();
        program.line(format!("{}.scale_to_fit_width({:.2})", var, max_width));
        program.dedent();
        program.line(format!("if {}.height > {:.2}:", var, max_height));
        program.indent();
        program.line(format!("{}.scale_to_fit_height({:.2})", var, max_height));
        program.dedent();
        program.line(format!(
            "{}.move_to(RIGHT * {:.3} + UP * {:.3})",
            var, center.0, center.1
        ));
        program.play(format!("Create({})", var), 1.0);
    }
}
