//! Splitting free-text model output into the two summary fields.
//!
//! Never fails: a missing marker degrades to the whole output in the first
//! field and a fixed placeholder in the second.

/// Headings a tier's output is expected to carry.
#[derive(Debug, Clone, Copy)]
pub struct SectionMarkers {
    /// Heading removed from the first section.
    pub lead: &'static str,
    /// Heading that opens the second section.
    pub split: &'static str,
    /// Second-field value when the split heading is missing or empty.
    pub placeholder: &'static str,
}

pub const WEEKLY: SectionMarkers = SectionMarkers {
    lead: "## 주간 성과 요약",
    split: "## 핵심 하이라이트",
    placeholder: "출력에서 핵심 하이라이트 구간을 찾지 못했습니다. 프롬프트를 확인해주세요.",
};

pub const MONTHLY: SectionMarkers = SectionMarkers {
    lead: "## 월간 종합 성과",
    split: "## 경력기술서용 요약",
    placeholder: "출력에서 경력기술서용 요약 구간을 찾지 못했습니다. 프롬프트를 확인해주세요.",
};

/// Split `output` into `(first, second)`.
///
/// The second section is everything after the first split heading.
pub fn split(output: &str, markers: &SectionMarkers) -> (String, String) {
    let (head, tail) = match output.split_once(markers.split) {
        Some((head, tail)) => (head, tail.trim()),
        None => (output, ""),
    };

    let mut first = head.replace(markers.lead, "").trim().to_string();
    if first.is_empty() {
        first = output.trim().to_string();
    }

    let second = if tail.is_empty() {
        markers.placeholder.to_string()
    } else {
        tail.to_string()
    };

    (first, second)
}
