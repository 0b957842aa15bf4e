use crate::ops::tracker::Story;

/// Width the story reference list is right-justified to.
pub const REFERENCE_WIDTH: usize = 12;

/// Build the commit message for `stories`.
///
/// The first line starts with the right-justified story references, e.g.
/// `   [#42, #7] `, followed by the note (if any) and one `Feature:` paragraph
/// per story.
pub fn compose(stories: &[Story], note: Option<&str>) -> String {
    let references = stories
        .iter()
        .map(|story| format!("#{}", story.id))
        .collect::<Vec<_>>()
        .join(", ");
    let mut message = format!("{:>width$} ", format!("[{references}]"), width = REFERENCE_WIDTH);

    if let Some(note) = note
        && !note.is_empty()
    {
        message.push_str(note);
        message.push_str("\n\n");
    }

    let features = stories
        .iter()
        .map(|story| format!("Feature: {}", story.name.trim()))
        .collect::<Vec<_>>()
        .join("\n\n");
    message.push_str(&features);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::tracker::StoryState;

    fn story(id: u64, name: &str) -> Story {
        Story {
            id,
            name: name.to_string(),
            current_state: StoryState::Started,
        }
    }

    #[test]
    fn test_compose_without_note() {
        let stories = [story(42, "Fix login"), story(7, "Add logout")];
        assert_eq!(
            compose(&stories, None),
            "   [#42, #7] Feature: Fix login\n\nFeature: Add logout"
        );
    }

    #[test]
    fn test_compose_with_note() {
        let stories = [story(42, "Fix login")];
        insta::assert_debug_snapshot!(
            compose(&stories, Some("Handle expired sessions")),
            @r#""       [#42] Handle expired sessions\n\nFeature: Fix login""#
        );
    }

    #[test]
    fn test_compose_empty_note_is_omitted() {
        let stories = [story(42, "Fix login")];
        assert_eq!(compose(&stories, Some("")), compose(&stories, None));
    }

    #[test]
    fn test_compose_trims_names() {
        let stories = [story(1, "  Padded name \n")];
        assert!(compose(&stories, None).ends_with("Feature: Padded name"));
    }

    #[test]
    fn test_compose_long_reference_list_is_not_truncated() {
        let stories = [story(123456, "A"), story(654321, "B")];
        let message = compose(&stories, None);
        assert!(message.starts_with("[#123456, #654321] Feature: A"));
    }

    #[test]
    fn test_compose_keeps_duplicates_in_order() {
        let stories = [story(2, "Two"), story(1, "One"), story(2, "Two")];
        insta::assert_debug_snapshot!(
            compose(&stories, None),
            @r#""[#2, #1, #2] Feature: Two\n\nFeature: One\n\nFeature: Two""#
        );
    }
}
