//! # 预定义辐射源波长
//!
//! 只读常量表，不可变，无需同步。查找时忽略大小写、空格、连字符，
//! 并把希腊字母 α/β 视为 a/b，因此 "Cu Kα"、"cu-ka"、"CUKA" 等价。

use serde::Serialize;

/// 辐射源
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RadiationSource {
    /// 显示名称
    pub name: &'static str,
    /// 规范化后的查找键
    pub keys: &'static [&'static str],
    /// 波长（Å）
    pub wavelength: f64,
}

/// 辐射源波长表 (Å)
pub const RADIATION_SOURCES: &[RadiationSource] = &[
    RadiationSource {
        name: "Cu Kα",
        keys: &["cuka"],
        wavelength: 1.5406,
    },
    RadiationSource {
        name: "Cu Kα1",
        keys: &["cuka1"],
        wavelength: 1.5406,
    },
    RadiationSource {
        name: "Cu Kα2",
        keys: &["cuka2"],
        wavelength: 1.5444,
    },
    RadiationSource {
        name: "Cu Kα (weighted)",
        keys: &["cukaavg", "cukaweighted", "cukaw"],
        wavelength: 1.5418,
    },
    RadiationSource {
        name: "Cu Kβ1",
        keys: &["cukb1", "cukb"],
        wavelength: 1.3922,
    },
    RadiationSource {
        name: "Mo Kα",
        keys: &["moka"],
        wavelength: 0.7107,
    },
    RadiationSource {
        name: "Mo Kα1",
        keys: &["moka1"],
        wavelength: 0.7093,
    },
    RadiationSource {
        name: "Co Kα",
        keys: &["coka"],
        wavelength: 1.7903,
    },
    RadiationSource {
        name: "Fe Kα",
        keys: &["feka"],
        wavelength: 1.9373,
    },
    RadiationSource {
        name: "Cr Kα",
        keys: &["crka"],
        wavelength: 2.2910,
    },
    RadiationSource {
        name: "Ag Kα",
        keys: &["agka"],
        wavelength: 0.5609,
    },
];

/// 规范化辐射源名称
fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .map(|c| match c {
            'α' | 'Α' => 'a',
            'β' | 'Β' => 'b',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// 按名称查找辐射源
pub fn find_source(name: &str) -> Option<&'static RadiationSource> {
    let key = normalize_key(name);
    RADIATION_SOURCES
        .iter()
        .find(|src| src.keys.iter().any(|k| *k == key))
}

/// 按名称查找波长 (Å)
pub fn get_predefined_wavelength(name: &str) -> Option<f64> {
    find_source(name).map(|src| src.wavelength)
}

/// 所有可用名称（用于错误提示）
pub fn known_source_names() -> String {
    RADIATION_SOURCES
        .iter()
        .map(|src| src.keys[0])
        .collect::<Vec<_>>()
        .join(", ")
}
