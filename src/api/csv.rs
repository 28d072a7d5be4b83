//! CSV export of a presentation's categorized answers

use crate::store::{question_id, PresentationDocument};

pub const CSV_HEADER: &str = "Question,Category,Answer";

/// Quote a field, doubling embedded quotes
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render one row per stored answer.
///
/// Questions follow registration order; category maps whose question was
/// never registered come last and are labelled by their id.
pub fn render(document: &PresentationDocument) -> String {
    let mut question_ids: Vec<String> = Vec::with_capacity(document.categories.len());
    for question in &document.questions {
        let id = question_id(question);
        if !question_ids.contains(&id) {
            question_ids.push(id);
        }
    }
    for id in document.categories.keys() {
        if !question_ids.contains(id) {
            question_ids.push(id.clone());
        }
    }

    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for id in &question_ids {
        let Some(categories) = document.categories.get(id) else {
            continue;
        };
        let label = quote(&document.question_label(id));
        for (category, answers) in categories {
            let category = quote(category);
            for answer in answers {
                out.push_str(&label);
                out.push(',');
                out.push_str(&category);
                out.push(',');
                out.push_str(&quote(answer));
                out.push('\n');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CategoryMap;

    fn document() -> PresentationDocument {
        let mut doc = PresentationDocument::new("demo");
        doc.register_question("What interests you?");
        doc.register_question("Unanswered?");

        let mut map = CategoryMap::new();
        map.insert(
            "AI Diagnostics".to_string(),
            vec!["neural nets".to_string(), "say \"hi\"".to_string()],
        );
        map.insert("Ethics".to_string(), vec!["bias, fairness".to_string()]);
        doc.merge_categories("what-interests-you", &map);
        doc
    }

    #[test]
    fn test_render_rows() {
        let csv = render(&document());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Question,Category,Answer");
        assert_eq!(
            lines[1],
            "\"What interests you?\",\"AI Diagnostics\",\"neural nets\""
        );
        assert_eq!(
            lines[2],
            "\"What interests you?\",\"AI Diagnostics\",\"say \"\"hi\"\"\""
        );
        assert_eq!(lines[3], "\"What interests you?\",\"Ethics\",\"bias, fairness\"");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_presentation_is_header_only() {
        let csv = render(&PresentationDocument::new("empty"));
        assert_eq!(csv, "Question,Category,Answer\n");
    }

    #[test]
    fn test_aliased_questions_export_once() {
        let mut doc = document();
        // Normalizes to the same id as the first question
        doc.register_question("what interests you");
        let csv = render(&doc);
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_unregistered_question_uses_id() {
        let mut doc = PresentationDocument::new("demo");
        let mut map = CategoryMap::new();
        map.insert("Misc".to_string(), vec!["x".to_string()]);
        doc.merge_categories("orphan-question", &map);

        let csv = render(&doc);
        assert!(csv.contains("\"orphan-question\",\"Misc\",\"x\""));
    }
}
