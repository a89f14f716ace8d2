//! Prompt construction for senryū generation.
//!
//! Pure functions from a normalized request (plus optional grounding facts)
//! to the instruction strings handed to the generation backend.

use crate::news::FactRecord;
use crate::request::{Mode, StyleRequest};

/// Elegance intensity guide, indexed by level 0..=3.
pub const ELEGANCE_STYLE: [&str; 4] = [
    "素朴。日常の情景を淡く描く。比喩は最小限。",
    "やや風雅。季語・自然描写を軽く挿し込む。",
    "雅趣を強める。余白や間、音の響きを意識。",
    "非常に風流。侘び寂び・季節感を濃く、言い切りは控えめ。",
];

/// Satire intensity guide, indexed by level 0..=3.
pub const SATIRE_STYLE: [&str; 4] = [
    "皮肉は抑えめ。微笑ましいオチで和ませる。",
    "軽い風刺。言い回しで少し突く。",
    "明確な風刺。社会や人間の滑稽を切り取る。",
    "強い風刺。問題点をズバッと斬り、痛快に落とす。",
];

pub fn system_prompt() -> String {
    [
        "あなたは日本語の川柳作家です。",
        "形式は五・七・五の三行。五・七・五は目安であり、音数の厳密さより自然な言い回しを優先する。",
        "出力は川柳本文のみ（3行）。前置きや解説、引用符は不要。",
    ]
    .join("\n")
}

/// Compose the generation instruction from the request, the retrieved facts,
/// and the current date (`YYYY-MM-DD`, passed in for testability).
pub fn compose_instruction(request: &StyleRequest, facts: &[FactRecord], today: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("今日の日付：{}", today));
    lines.push(format!("モード：{}", request.mode.as_str()));
    lines.push(format!("テーマ：{}", request.theme));

    if request.keywords.is_empty() {
        lines.push("キーワード指定なし".to_string());
    } else {
        lines.push(format!(
            "キーワード（任意で含める）：{}",
            request.keywords.join("、")
        ));
    }

    let elegance = request.elegance_level.min(3) as usize;
    let satire = request.satire_level.min(3) as usize;
    lines.push(format!(
        "風流度（0〜3）：{} → {}",
        elegance, ELEGANCE_STYLE[elegance]
    ));
    lines.push(format!(
        "風刺度（0〜3）：{} → {}",
        satire, SATIRE_STYLE[satire]
    ));

    if request.mode == Mode::Current {
        if facts.is_empty() {
            lines.push(
                "時事の根拠情報は取得できなかった。一般的な傾向に寄せて詠み、具体的な出来事や固有名詞を捏造しない。"
                    .to_string(),
            );
        } else {
            lines.push("直近のニュース（根拠として参照）：".to_string());
            for (index, fact) in facts.iter().enumerate() {
                lines.push(format!("[{}] {} {}", index + 1, fact.date, fact.title));
            }
            if request.include_citations {
                lines.push("出典リンク：".to_string());
                for (index, fact) in facts.iter().enumerate() {
                    lines.push(format!("[{}] {}", index + 1, fact.link));
                }
            }
        }
    }

    lines.push("言い換えや比喩で新鮮味を出し、類型的なフレーズは避ける。".to_string());
    lines.push("同じネタ・同じオチを連発しない。".to_string());
    lines.push("出力は川柳本文のみ。前置き・解説・引用符は不要。".to_string());

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> StyleRequest {
        StyleRequest {
            mode: Mode::Normal,
            theme: "office".to_string(),
            keywords: vec!["coffee".to_string(), "monday".to_string()],
            satire_level: 0,
            elegance_level: 3,
            count: 1,
            recency_days: 3,
            max_articles: 6,
            include_citations: false,
        }
    }

    fn sample_facts() -> Vec<FactRecord> {
        vec![
            FactRecord {
                title: "選挙戦が最終盤に".to_string(),
                date: "2025-08-18".to_string(),
                link: "https://example.com/a".to_string(),
            },
            FactRecord {
                title: "投票率の行方".to_string(),
                date: "2025-08-17".to_string(),
                link: "https://example.com/b".to_string(),
            },
        ]
    }

    #[test]
    fn test_normal_mode_has_no_grounding_section() {
        let instruction = compose_instruction(&base_request(), &[], "2025-08-20");
        assert!(instruction.contains("キーワード（任意で含める）：coffee、monday"));
        assert!(instruction.contains("風刺度（0〜3）：0"));
        assert!(instruction.contains("風流度（0〜3）：3"));
        assert!(!instruction.contains("直近のニュース"));
        assert!(!instruction.contains("出典リンク"));
        assert!(!instruction.contains("根拠情報は取得できなかった"));
    }

    #[test]
    fn test_current_mode_emits_numbered_grounding_lines() {
        let mut request = base_request();
        request.mode = Mode::Current;
        let instruction = compose_instruction(&request, &sample_facts(), "2025-08-20");
        assert!(instruction.contains("[1] 2025-08-18 選挙戦が最終盤に"));
        assert!(instruction.contains("[2] 2025-08-17 投票率の行方"));
        // Citations are gated on includeCitations.
        assert!(!instruction.contains("出典リンク"));
    }

    #[test]
    fn test_current_mode_with_citations() {
        let mut request = base_request();
        request.mode = Mode::Current;
        request.include_citations = true;
        let instruction = compose_instruction(&request, &sample_facts(), "2025-08-20");
        assert!(instruction.contains("出典リンク："));
        assert!(instruction.contains("[1] https://example.com/a"));
        assert!(instruction.contains("[2] https://example.com/b"));
    }

    #[test]
    fn test_current_mode_without_facts_notes_missing_grounding() {
        let mut request = base_request();
        request.mode = Mode::Current;
        let instruction = compose_instruction(&request, &[], "2025-08-20");
        assert!(instruction.contains("根拠情報は取得できなかった"));
        assert!(!instruction.contains("直近のニュース"));
    }

    #[test]
    fn test_empty_keywords_marker() {
        let mut request = base_request();
        request.keywords.clear();
        let instruction = compose_instruction(&request, &[], "2025-08-20");
        assert!(instruction.contains("キーワード指定なし"));
    }

    #[test]
    fn test_date_marker_present() {
        let instruction = compose_instruction(&base_request(), &[], "2025-08-20");
        assert!(instruction.contains("今日の日付：2025-08-20"));
    }
}
