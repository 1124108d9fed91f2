//! Prompt construction for care-plan generation.
//!
//! Pure string builders; nothing here talks to the network.

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of a long- or short-term goal.
pub const GOAL_MAX_CHARS: usize = 55;

/// Instruction used when the user asks for a refinement without saying how.
pub const DEFAULT_REFINEMENT_INSTRUCTION: &str = "より良い表現に修正して";

const ITEM_SEPARATOR: &str = "、";

/// One category's assessment, as fed to the integrated prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratedCategory {
    pub id: String,
    pub name: String,
    pub checked_items: Vec<String>,
    pub detail_text: String,
}

/// Build the request for a single category's four plan fields.
///
/// The model is asked for one flat JSON object keyed `needs`,
/// `longTermGoal`, `shortTermGoal`, `serviceContent`.
pub fn build_category_prompt(category_name: &str, checked_items: &[String], detail_text: &str) -> String {
    let mut info = format!(
        "【カテゴリ】{category_name}\n【課題項目】{}\n",
        checked_items.join(ITEM_SEPARATOR)
    );
    if !detail_text.is_empty() {
        info.push_str(&format!("【具体的内容】{detail_text}\n"));
    }

    format!(
        "あなたは介護施設のケアマネジャーです。以下のアセスメント情報に基づいて、\
施設サービス計画書（第2表）に記載する文言を提案してください。

{info}
以下の4項目を日本語で提案してください：
1. ニーズ（生活全般の解決すべき課題）
2. 長期目標（**必ず{GOAL_MAX_CHARS}文字以内**で、「〜〜できる」で終わる文章にすること）
3. 短期目標（**必ず{GOAL_MAX_CHARS}文字以内**で、「〜〜できる」で終わる文章にすること）
4. サービス内容

回答は以下のJSON形式で返してください：
{{
  \"needs\": \"ニーズの文言\",
  \"longTermGoal\": \"長期目標の文言（{GOAL_MAX_CHARS}文字以内、〜〜できるで終わる）\",
  \"shortTermGoal\": \"短期目標の文言（{GOAL_MAX_CHARS}文字以内、〜〜できるで終わる）\",
  \"serviceContent\": \"サービス内容の文言\"
}}"
    )
}

/// Build the request that analyzes several categories jointly.
///
/// Related categories may share needs or a long-term goal, but the model must
/// still return exactly one record per input category, each tagged with its
/// `categoryName`.
pub fn build_integrated_prompt(categories: &[IntegratedCategory]) -> String {
    let category_info = categories
        .iter()
        .enumerate()
        .map(|(index, cat)| {
            let mut block = format!(
                "【カテゴリ{}: {}】\n・課題項目: {}",
                index + 1,
                cat.name,
                cat.checked_items.join(ITEM_SEPARATOR)
            );
            if !cat.detail_text.is_empty() {
                block.push_str(&format!("\n・具体的内容: {}", cat.detail_text));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let count = categories.len();

    format!(
        "あなたは介護施設のベテランケアマネジャーです。以下の複数カテゴリのアセスメント情報を\
統合的に分析し、施設サービス計画書（第2表）を作成してください。

【アセスメント情報】
{category_info}

【作成のポイント】
1. すべてのカテゴリの情報を統合的に分析してください
2. 関連性のある課題は、共通のニーズ・長期目標でまとめてください
   - 例：排泄と基本動作が関連している場合は同じニーズにする
   - 関連がないものは別のニーズ・長期目標にする
3. ニーズと長期目標の組み合わせは自由に判断してください
   - 同じニーズで違う長期目標もOK
   - 違うニーズで同じ長期目標もOK
4. 各カテゴリごとに短期目標とサービス内容を設定してください
5. 長期目標・短期目標は{GOAL_MAX_CHARS}文字以内で「〜〜できる」で終わる文章にしてください

【出力形式】
以下のJSON配列形式で、カテゴリ数と同じ{count}件のオブジェクトを返してください：
[
  {{
    \"categoryName\": \"カテゴリ名\",
    \"needs\": \"ニーズの文言（関連カテゴリは同じニーズにする）\",
    \"longTermGoal\": \"長期目標（{GOAL_MAX_CHARS}文字以内、〜〜できるで終わる）\",
    \"shortTermGoal\": \"短期目標（{GOAL_MAX_CHARS}文字以内、〜〜できるで終わる）\",
    \"serviceContent\": \"サービス内容\"
  }},
  ...
]"
    )
}

/// Build the request that rewrites one field according to an instruction.
///
/// The model is asked for the revised text only, with no JSON wrapping.
pub fn build_refinement_prompt(current_text: &str, instruction: &str) -> String {
    let instruction = match instruction.trim() {
        "" => DEFAULT_REFINEMENT_INSTRUCTION,
        given => given,
    };

    format!(
        "以下の介護計画書の文言を、指示に従って修正してください。

【現在の文言】
{current_text}

【修正指示】
{instruction}

【注意事項】
- 介護計画書に適した専門的かつ分かりやすい表現にしてください
- 修正後の文言のみを返してください（説明不要）"
    )
}
