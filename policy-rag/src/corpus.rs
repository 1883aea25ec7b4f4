//! Policy corpus sources: JSON files and the built-in HR handbook.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::document::PolicyDocument;
use crate::error::{RagError, Result};

/// Read a JSON array of [`PolicyDocument`]s from `path`.
///
/// # Errors
///
/// Returns [`RagError::Corpus`] if the file cannot be read or parsed, or if
/// two documents share an id.
pub fn load_corpus_file(path: impl AsRef<Path>) -> Result<Vec<PolicyDocument>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| RagError::Corpus(format!("failed to read '{}': {e}", path.display())))?;
    let documents = parse_corpus(&raw)?;
    info!(path = %path.display(), document_count = documents.len(), "loaded policy corpus");
    Ok(documents)
}

/// Parse a JSON array of [`PolicyDocument`]s, rejecting duplicate ids.
pub fn parse_corpus(raw: &str) -> Result<Vec<PolicyDocument>> {
    let documents: Vec<PolicyDocument> = serde_json::from_str(raw)
        .map_err(|e| RagError::Corpus(format!("invalid corpus JSON: {e}")))?;

    let mut seen = HashSet::new();
    for doc in &documents {
        if !seen.insert(doc.id.as_str()) {
            return Err(RagError::Corpus(format!("duplicate policy id '{}'", doc.id)));
        }
    }
    Ok(documents)
}

/// The built-in employee handbook.
pub fn default_corpus() -> Vec<PolicyDocument> {
    vec![
        PolicyDocument::new(
            "leave-001",
            "Annual Leave and Vacation Policy",
            "Full-time employees receive 20 days of paid annual leave per calendar year, \
             accrued monthly. Vacation requests must be submitted through the HR portal at \
             least two weeks in advance and approved by your manager. Up to 5 unused days may \
             be carried over into the next year. Sick leave is separate: employees receive 10 \
             paid sick days per year, and absences longer than three days require a medical \
             certificate.",
            "Leave",
        )
        .with_tags(["vacation", "annual leave", "sick leave"]),
        PolicyDocument::new(
            "leave-002",
            "Parental Leave Policy",
            "Employees are entitled to 16 weeks of paid maternity leave and 4 weeks of paid \
             paternity leave. Parental leave may begin up to two weeks before the expected \
             birth or adoption date. Notice should be given to HR at least eight weeks in \
             advance.",
            "Leave",
        )
        .with_tags(["maternity", "paternity"]),
        PolicyDocument::new(
            "work-001",
            "Remote and Hybrid Work Policy",
            "Employees may work from home up to three days per week with manager approval. \
             Remote workers must be reachable during core hours from 10:00 to 15:00, use the \
             company VPN, and keep their laptop and equipment secure. Fully remote \
             arrangements require director sign-off.",
            "Work Arrangements",
        )
        .with_tags(["remote", "hybrid", "home"]),
        PolicyDocument::new(
            "conduct-001",
            "Code of Conduct",
            "All employees are expected to act with integrity and treat colleagues with \
             respect. Harassment and discrimination of any kind are not tolerated. Business \
             casual dress applies in the office. Report ethics concerns or a grievance to HR \
             or through the anonymous complaint hotline.",
            "Conduct",
        )
        .with_tags(["ethics", "harassment"]),
        PolicyDocument::new(
            "benefits-001",
            "Employee Benefits Overview",
            "The company provides health, dental, and vision insurance for employees and \
             dependents, with premiums 80% covered by the employer. Employees may join the \
             retirement pension plan after three months, with employer matching up to 5% of \
             salary.",
            "Benefits",
        )
        .with_tags(["insurance", "pension"]),
        PolicyDocument::new(
            "performance-001",
            "Performance Review Process",
            "Performance reviews are held twice a year, in June and December. Employees set \
             goals with their manager at the start of each cycle, complete a self appraisal, \
             and receive written feedback. Review outcomes inform promotion and annual bonus \
             decisions.",
            "Performance",
        )
        .with_tags(["appraisal", "bonus"]),
        PolicyDocument::new(
            "expense-001",
            "Travel and Expense Reimbursement",
            "Business travel must be booked through the approved travel portal. Submit expense \
             claims with itemized receipts within 30 days. Reimbursement is paid with the next \
             payroll run. Meals are covered up to 50 per day while travelling.",
            "Finance",
        )
        .with_tags(["travel", "expense"]),
        PolicyDocument::new(
            "training-001",
            "Training and Development Policy",
            "Each employee has an annual learning budget of 1,500 for courses, conferences, \
             and certification exams. Mandatory security and safety training must be \
             completed within 30 days of joining and renewed every year.",
            "Training",
        )
        .with_tags(["learning", "certification"]),
    ]
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_corpus_has_unique_ids() {
        let corpus = default_corpus();
        let ids: HashSet<_> = corpus.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), corpus.len());
    }

    #[test]
    fn parse_rejects_duplicate_ids() {
        let raw = r#"[
            {"id": "a", "title": "A", "content": "a", "category": "X"},
            {"id": "a", "title": "B", "content": "b", "category": "Y"}
        ]"#;
        assert!(matches!(parse_corpus(raw), Err(RagError::Corpus(_))));
    }

    #[test]
    fn load_corpus_file_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "p1", "title": "Leave", "content": "20 days", "category": "Leave", "tags": ["pto"]}}]"#
        )
        .unwrap();

        let corpus = load_corpus_file(file.path()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].tags, vec!["pto".to_string()]);
    }

    #[test]
    fn missing_file_is_a_corpus_error() {
        let err = load_corpus_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RagError::Corpus(_)));
    }
}
