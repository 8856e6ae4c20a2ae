//! 贝塞尔曲线插值

use glam::Vec2;

/// 牛顿迭代次数上限的默认值
pub const DEFAULT_BEZIER_ITERATIONS: u32 = 12;
/// 牛顿迭代收敛误差的默认值
pub const DEFAULT_BEZIER_EPSILON: f32 = 0.0005;

/// 贝塞尔曲线（用于 VMD 动画插值）
///
/// 端点固定为 (0,0) 和 (1,1)，只保存两个控制点。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierCurve {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl BezierCurve {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn from_control_points(p1: Vec2, p2: Vec2) -> Self {
        Self::new(p1.x, p1.y, p2.x, p2.y)
    }

    /// 线性插值（MMD 默认的 20/107 控制点）
    pub fn linear() -> Self {
        Self::from_vmd_data(&[20, 20, 107, 107])
    }

    /// 从 VMD 插值数据创建 [x1, y1, x2, y2]
    pub fn from_vmd_data(data: &[u8; 4]) -> Self {
        Self {
            x1: data[0] as f32 / 127.0,
            y1: data[1] as f32 / 127.0,
            x2: data[2] as f32 / 127.0,
            y2: data[3] as f32 / 127.0,
        }
    }

    /// 控制点都在对角线上，曲线即 y = x
    pub fn is_linear(&self) -> bool {
        (self.x1 - self.y1).abs() < f32::EPSILON && (self.x2 - self.y2).abs() < f32::EPSILON
    }

    /// 使用默认参数求值
    pub fn evaluate(&self, x: f32) -> f32 {
        self.evaluate_with(x, DEFAULT_BEZIER_ITERATIONS, DEFAULT_BEZIER_EPSILON)
    }

    /// 求 x 对应的 y
    ///
    /// 先用牛顿法解 bezier_x(s) = x，再返回 bezier_y(s)。
    pub fn evaluate_with(&self, x: f32, iterations: u32, epsilon: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        if self.is_linear() {
            return x;
        }

        let mut s = x;
        for _ in 0..iterations {
            let fx = self.bezier_x(s) - x;
            if fx.abs() <= epsilon {
                break;
            }

            let dx = self.bezier_dx(s);
            if dx.abs() < 1e-6 {
                // 导数太小时退化为二分式的步进
                s -= fx * 0.5;
            } else {
                s -= fx / dx;
            }
            s = s.clamp(0.0, 1.0);
        }

        self.bezier_y(s)
    }

    fn bezier_x(&self, s: f32) -> f32 {
        let t = 1.0 - s;
        3.0 * t * t * s * self.x1 + 3.0 * t * s * s * self.x2 + s * s * s
    }

    fn bezier_y(&self, s: f32) -> f32 {
        let t = 1.0 - s;
        3.0 * t * t * s * self.y1 + 3.0 * t * s * s * self.y2 + s * s * s
    }

    fn bezier_dx(&self, s: f32) -> f32 {
        let t = 1.0 - s;
        3.0 * t * t * self.x1 + 6.0 * t * s * (self.x2 - self.x1) + 3.0 * s * s * (1.0 - self.x2)
    }
}
