//! # 系统消光与点阵类型判别
//!
//! 对每种点阵类型检查所有观测 (hkl) 是否都满足其反射条件。
//! 只能排除与数据矛盾的类型，不能证明某一空间群，因此结果始终表述为
//! "可能的点阵类型"，并附带说明。
//!
//! ## 反射条件
//! | 类型 | 条件 |
//! |------|------|
//! | P | 无限制 |
//! | I | h+k+l 为偶数 |
//! | F | h,k,l 全奇或全偶 |
//! | F (d) | 全奇或全偶，且 h+k+l ≡ 0 (mod 4) |
//! | C | h+k 为偶数 |
//! | R | −h+k+l ≡ 0 (mod 3)（正向设置） |
//!
//! ## 依赖关系
//! - 被 `commands/extinction.rs` 调用
//! - 使用 `models/peak.rs` 的 MillerIndex

use crate::error::Result;
use crate::models::MillerIndex;

use serde::Serialize;

/// 判别结果的固定说明
pub const EXTINCTION_CAVEAT: &str = "Systematic absences only rule lattice types out; the listed \
centerings are possible lattices consistent with the observed reflections, not a definitive \
space-group assignment. Missing weak reflections or overlapping peaks can mimic absences.";

/// 点阵类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Centering {
    Primitive,
    BodyCentered,
    FaceCentered,
    DiamondFaceCentered,
    BaseCentered,
    Rhombohedral,
}

impl Centering {
    pub const ALL: [Centering; 6] = [
        Centering::Primitive,
        Centering::BodyCentered,
        Centering::FaceCentered,
        Centering::DiamondFaceCentered,
        Centering::BaseCentered,
        Centering::Rhombohedral,
    ];

    /// 点阵符号
    pub fn symbol(&self) -> &'static str {
        match self {
            Centering::Primitive => "P",
            Centering::BodyCentered => "I",
            Centering::FaceCentered => "F",
            Centering::DiamondFaceCentered => "F (d-glide)",
            Centering::BaseCentered => "C",
            Centering::Rhombohedral => "R",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Centering::Primitive => "Primitive",
            Centering::BodyCentered => "Body-centered",
            Centering::FaceCentered => "Face-centered",
            Centering::DiamondFaceCentered => "Diamond (face-centered with d-glide)",
            Centering::BaseCentered => "Base-centered",
            Centering::Rhombohedral => "Rhombohedral (obverse)",
        }
    }

    /// 反射条件描述
    pub fn rule(&self) -> &'static str {
        match self {
            Centering::Primitive => "No systematic absences from centering",
            Centering::BodyCentered => "Reflections present only when h+k+l is even",
            Centering::FaceCentered => "Reflections present only when h, k, l are all even or all odd",
            Centering::DiamondFaceCentered => {
                "h, k, l unmixed and h+k+l = 4n (diamond-type d-glide)"
            }
            Centering::BaseCentered => "Reflections present only when h+k is even",
            Centering::Rhombohedral => "Reflections present only when -h+k+l = 3n (hexagonal axes)",
        }
    }

    /// 示例空间群
    pub fn example_space_groups(&self) -> &'static [&'static str] {
        match self {
            Centering::Primitive => &["Pm-3m (CsCl)", "P6_3/mmc", "P4/mmm", "Pnma"],
            Centering::BodyCentered => &["Im-3m (W, α-Fe)", "I4/mmm", "I4_1/amd (anatase)"],
            Centering::FaceCentered => &["Fm-3m (NaCl, Cu)", "F-43m (ZnS)", "Fddd"],
            Centering::DiamondFaceCentered => &["Fd-3m (Si, diamond)", "Fd-3m (spinel)"],
            Centering::BaseCentered => &["C2/m", "Cmcm", "Cmca"],
            Centering::Rhombohedral => &["R-3m (Bi2Te3)", "R-3c (α-Al2O3)", "R3m"],
        }
    }

    /// 单个反射是否满足该点阵类型的反射条件
    pub fn allows(&self, hkl: &MillerIndex) -> bool {
        let (h, k, l) = hkl.as_i64();
        match self {
            Centering::Primitive => true,
            Centering::BodyCentered => hkl.sum().rem_euclid(2) == 0,
            Centering::FaceCentered => hkl.is_unmixed(),
            Centering::DiamondFaceCentered => hkl.is_unmixed() && hkl.sum().rem_euclid(4) == 0,
            Centering::BaseCentered => (h + k).rem_euclid(2) == 0,
            Centering::Rhombohedral => (-h + k + l).rem_euclid(3) == 0,
        }
    }
}

/// 候选点阵类型
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenteringCandidate {
    pub centering: Centering,
    pub symbol: &'static str,
    pub name: &'static str,
    pub rule: &'static str,
    pub example_space_groups: &'static [&'static str],
}

impl From<Centering> for CenteringCandidate {
    fn from(centering: Centering) -> Self {
        CenteringCandidate {
            centering,
            symbol: centering.symbol(),
            name: centering.name(),
            rule: centering.rule(),
            example_space_groups: centering.example_space_groups(),
        }
    }
}

/// 消光判别结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtinctionVerdict {
    /// 与数据不矛盾的点阵类型，P 总在首位
    pub candidates: Vec<CenteringCandidate>,
    /// 参与判别的反射数
    pub reflections_tested: usize,
    pub caveat: &'static str,
}

impl ExtinctionVerdict {
    pub fn contains(&self, centering: Centering) -> bool {
        self.candidates.iter().any(|c| c.centering == centering)
    }
}

/// 按系统消光判别可能的点阵类型
pub fn classify_extinctions(peaks: &[MillerIndex]) -> Result<ExtinctionVerdict> {
    for hkl in peaks {
        hkl.validate()?;
    }

    let candidates = Centering::ALL
        .into_iter()
        .filter(|centering| match centering {
            Centering::Primitive => true,
            // 没有任何反射时规则未被检验，不纳入候选
            _ => !peaks.is_empty() && peaks.iter().all(|hkl| centering.allows(hkl)),
        })
        .map(CenteringCandidate::from)
        .collect();

    Ok(ExtinctionVerdict {
        candidates,
        reflections_tested: peaks.len(),
        caveat: EXTINCTION_CAVEAT,
    })
}
