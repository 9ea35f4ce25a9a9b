//! Parameterized marker-encoding cases
//!
//! Table-driven coverage of the canonical forms each encoder emits and the
//! counts it reports, run through the full default pipeline so ordering
//! effects are included.

use psyclean::clean::pipeline::Pipeline;
use psyclean::clean::record::{MarkerKind, Record};
use rstest::rstest;

fn clean(text: &str) -> psyclean::clean::record::CleanedRecord {
    Pipeline::with_defaults()
        .unwrap()
        .clean(&Record::new("case", text))
}

#[rstest]
#[case("soooo nice", "so[EMPH] nice", 1)]
#[case("yessss", "yes[EMPH]", 1)]
#[case("aaahhhh", "a[EMPH]h[EMPH]", 2)]
#[case("good day", "good day", 0)]
fn repeated_letter_cases(#[case] input: &str, #[case] expected: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.text, expected);
    assert_eq!(cleaned.marker(MarkerKind::RepeatedLetter), count);
}

#[rstest]
#[case("THIS rocks", "this[CAPS] rocks", 1)]
#[case("I do", "i do", 0)] // "I" is under the length threshold
#[case("ABC123 stays", "abc123 stays", 0)] // mixed alphanumeric is not shouting
#[case("WOW. WOW!", "wow[CAPS]. wow[CAPS]!", 2)]
fn allcaps_cases(#[case] input: &str, #[case] expected: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.text, expected);
    assert_eq!(cleaned.marker(MarkerKind::AllcapsWord), count);
}

#[rstest]
#[case("wow!!!", "wow!![X3]", 1)]
#[case("really????", "really??[X4]", 1)]
#[case("wait... no!!", "wait..[X3] no!![X2]", 2)]
#[case("fine.", "fine.", 0)]
fn repeat_punct_cases(#[case] input: &str, #[case] expected: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.text, expected);
    assert_eq!(cleaned.marker(MarkerKind::RepeatPunct), count);
}

#[rstest]
#[case(":) fun", 1)]
#[case(":) :( xD", 3)]
#[case("🔥🔥 lit", 2)]
#[case("no emoticons", 0)]
fn emoticon_counting_cases(#[case] input: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.marker(MarkerKind::Emoticon), count);
}

#[rstest]
#[case("ask @sam now", "ask [MENTION] now", 1)]
#[case("@a @b @c", "[MENTION] [MENTION] [MENTION]", 3)]
fn mention_cases(#[case] input: &str, #[case] expected: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.text, expected);
    assert_eq!(cleaned.marker(MarkerKind::Mention), count);
}

#[rstest]
#[case("love #LongWalks", "love long walks", 1)]
#[case("#tbt memories", "tbt memories", 1)]
fn hashtag_cases(#[case] input: &str, #[case] expected: &str, #[case] count: u32) {
    let cleaned = clean(input);
    assert_eq!(cleaned.text, expected);
    assert_eq!(cleaned.marker(MarkerKind::Hashtag), count);
}
