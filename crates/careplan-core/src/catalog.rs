//! Assessment category catalog.
//!
//! The fixed set of life-domain categories a care manager assesses, each with
//! its ordered list of checkable concern statements. The catalog is static
//! data known at startup; nothing mutates it.

use serde::Serialize;

use crate::error::CoreError;

/// A life-domain topic under which assessment items are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Stable key, e.g. `"meal"`.
    pub id: &'static str,
    /// Display label, e.g. `"食事"`.
    pub name: &'static str,
    /// Checkable concern statements, in display order.
    pub items: &'static [&'static str],
}

impl Category {
    /// Position of an item within this category, if it belongs here.
    pub fn item_index(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| *i == item)
    }
}

/// The category that is focused when a new assessment starts.
pub const DEFAULT_CATEGORY_ID: &str = "meal";

const CATEGORIES: &[Category] = &[
    Category {
        id: "meal",
        name: "食事",
        items: &[
            "食事の姿勢が不安定",
            "食べこぼしが多い",
            "むせ込みがある",
            "食事量にむらがある",
            "水分摂取量が少ない",
            "咀嚼が困難で食形態の工夫が必要",
            "視力低下により食器の位置が分からない",
        ],
    },
    Category {
        id: "excretion",
        name: "排泄",
        items: &[
            "尿意・便意がはっきりしない",
            "失禁がある",
            "トイレまでの移動に介助が必要",
            "排泄後の後始末が困難",
            "便秘傾向がある",
            "夜間の排泄回数が多い",
        ],
    },
    Category {
        id: "bathing",
        name: "入浴",
        items: &[
            "浴槽の出入りが困難",
            "洗身・洗髪に介助が必要",
            "入浴を拒否することがある",
            "皮膚の乾燥・かゆみがある",
            "入浴後の疲労が強い",
        ],
    },
    Category {
        id: "mobility",
        name: "基本動作・移動",
        items: &[
            "立ち上がりが不安定",
            "歩行時にふらつきがある",
            "転倒歴がある",
            "車いすへの移乗に介助が必要",
            "寝返り・起き上がりが困難",
            "下肢筋力が低下している",
        ],
    },
    Category {
        id: "grooming",
        name: "整容・更衣",
        items: &[
            "衣服の着脱に介助が必要",
            "季節に合った衣服を選べない",
            "歯みがき・口腔ケアが不十分",
            "整髪・爪切りに介助が必要",
        ],
    },
    Category {
        id: "communication",
        name: "コミュニケーション",
        items: &[
            "難聴があり会話が聞き取りにくい",
            "言葉がうまく出てこない",
            "意思表示が困難",
            "他者との交流が少ない",
        ],
    },
    Category {
        id: "cognition",
        name: "認知・精神",
        items: &[
            "物忘れが多い",
            "日時や場所が分からないことがある",
            "夜間に不穏・徘徊がある",
            "意欲が低下している",
            "不安を訴えることが多い",
        ],
    },
    Category {
        id: "health",
        name: "健康管理",
        items: &[
            "服薬管理ができない",
            "血圧が不安定",
            "褥瘡・皮膚トラブルがある",
            "痛みの訴えがある",
            "体重が減少している",
            "睡眠が不規則",
        ],
    },
    Category {
        id: "social",
        name: "社会参加・生活",
        items: &[
            "日中の活動量が少ない",
            "趣味や役割がない",
            "家族との関わりが少ない",
            "レクリエーションへの参加を拒む",
        ],
    },
];

/// Return every category, in display order.
pub fn all_categories() -> &'static [Category] {
    CATEGORIES
}

/// Look up a category by ID.
pub fn get_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Look up a category by ID, failing with [`CoreError::UnknownCategory`].
pub fn require_category(id: &str) -> Result<&'static Category, CoreError> {
    get_category(id).ok_or_else(|| CoreError::UnknownCategory(id.to_string()))
}
