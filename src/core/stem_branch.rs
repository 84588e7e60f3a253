//! The two cyclical alphabets behind year, epoch and pillar labels.

/// The ten heavenly stems, in cycle order.
pub const STEMS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];

/// The twelve earthly branches, in cycle order.
pub const BRANCHES: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

/// Returns `true` for a label made of exactly one stem followed by one branch.
#[must_use]
pub fn is_stem_branch(label: &str) -> bool {
    let mut glyphs = label.chars();
    match (glyphs.next(), glyphs.next(), glyphs.next()) {
        (Some(stem), Some(branch), None) => STEMS.contains(&stem) && BRANCHES.contains(&branch),
        _ => false,
    }
}
