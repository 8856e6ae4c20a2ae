//! 骨骼系统和 IK 求解器

mod bone;
mod ik_solver;
mod manager;

pub use bone::{BoneIdx, BoneNode, BoneType, PmdBone, PmdIk};
pub use ik_solver::{cosine_rule_angles, IkSolver};
pub use manager::BoneTree;
