//! Prompt text and record formatting for the chat summarizer.

use std::fmt::Write as _;

use worklog_markdown::render;
use worklog_shared::{EnrichedRecord, fields};

pub const WEEKLY_SYSTEM_PROMPT: &str = "\
당신은 개발자의 업무 기록을 이력서와 성과 평가에 쓸 수 있는 문장으로 정리하는 커리어 코치입니다.
일주일 동안의 일일 로그를 읽고, 과장 없이 사실과 정량 지표에 근거해 성과를 요약하세요.

반드시 아래 형식의 마크다운으로만 답하세요.

## 주간 성과 요약
- 이력서에 그대로 옮길 수 있는 불릿 포인트 (행동 + 기술 + 결과, 3~6개)

## 핵심 하이라이트
1. 이번 주 가장 중요한 성과 한 줄
2. 두 번째 성과 한 줄
3. 세 번째 성과 한 줄";

pub const MONTHLY_SYSTEM_PROMPT: &str = "\
당신은 개발자의 주간 성과를 월 단위로 묶어 경력기술서 문장으로 다듬는 커리어 코치입니다.
여러 주의 성과에서 반복되는 주제와 가장 큰 임팩트를 찾아 정리하세요.

반드시 아래 형식의 마크다운으로만 답하세요.

## 월간 종합 성과
이번 달의 흐름과 주요 성과를 설명하는 문단과 불릿 포인트

## 경력기술서용 요약
- 경력기술서에 바로 넣을 수 있는 STAR 형식의 항목 (2~4개)";

/// User prompt for a weekly rollup.
pub fn weekly_user_prompt(logs: &[EnrichedRecord]) -> String {
    format!(
        "다음은 이번 주에 기록된 일일 업무 로그입니다.\n\n{}\n\n위 로그를 바탕으로 주간 성과를 정리해주세요.",
        format_daily_logs(logs)
    )
}

/// User prompt for a monthly rollup.
pub fn monthly_user_prompt(weeks: &[EnrichedRecord]) -> String {
    format!(
        "다음은 이번 달의 주간 성과 기록입니다.\n\n{}\n\n위 기록을 바탕으로 월간 성과를 정리해주세요.",
        format_weekly_achievements(weeks)
    )
}

/// One numbered section per daily log.
pub fn format_daily_logs(logs: &[EnrichedRecord]) -> String {
    let mut out = String::new();
    for (idx, log) in logs.iter().enumerate() {
        let metrics = match log.text(fields::METRICS) {
            "" => "N/A",
            m => m,
        };
        let _ = write!(
            out,
            "\n### 로그 {}: {}\n- **카테고리**: {}\n- **영향도**: {}\n- **기술 스택**: {}\n- **정량 지표**: {}\n\n**상세 컨텍스트**:\n{}\n---\n",
            idx + 1,
            log.text(fields::TITLE),
            log.text(fields::CATEGORY),
            log.text(fields::IMPACT_LEVEL),
            log.list(fields::TECH_STACK).join(", "),
            metrics,
            render(&log.content),
        );
    }
    out
}

/// One section per weekly achievement.
pub fn format_weekly_achievements(weeks: &[EnrichedRecord]) -> String {
    let mut out = String::new();
    for week in weeks {
        let _ = write!(
            out,
            "\n### {}\n**핵심 하이라이트**: {}\n\n**주간 성과**:\n{}\n---\n",
            week.text(fields::TITLE),
            week.text(fields::KEY_HIGHLIGHTS),
            render(&week.content),
        );
    }
    out
}
