use folio_content::{deduplicate_content, validate, ValidateOptions};
use proptest::prelude::*;

const PARAGRAPHS: &[&str] = &[
    "Tubeless tyres seal small punctures on their own, which is why many gravel riders switched to them. The sealant needs topping up every few months and the rims must be tubeless ready.",
    "Disc brakes stop reliably in the wet, but the rotors warp when they overheat on long descents. Bedding in new pads restores most of the lost bite after a rotor swap.",
    "A chain checker tool tells you when the chain has stretched past half a percent. Replacing the chain at that point saves the cassette and the chainrings from early wear.",
    "Short note.",
    "Torque wrenches matter on carbon parts.",
];

fn document() -> impl Strategy<Value = String> {
    let section = (0usize..4, prop::collection::vec(0usize..PARAGRAPHS.len(), 1..4));
    prop::collection::vec(section, 1..7).prop_map(|sections| {
        let mut doc = String::from("# Bike Care\n\n");
        for (heading, paragraphs) in sections {
            doc.push_str(&format!("## Topic {heading}\n\n"));
            for p in paragraphs {
                doc.push_str(PARAGRAPHS[p]);
                doc.push_str("\n\n");
            }
        }
        doc
    })
}

proptest! {
    #[test]
    fn dedup_is_idempotent(doc in document()) {
        let once = deduplicate_content(&doc);
        let twice = deduplicate_content(&once.content);
        prop_assert_eq!(twice.removed_count, 0);
        prop_assert_eq!(&twice.content, &once.content);
    }

    #[test]
    fn dedup_never_grows_content(doc in document()) {
        let outcome = deduplicate_content(&doc);
        prop_assert!(outcome.content.len() <= doc.len());
        prop_assert_eq!(outcome.fix_log.len(), outcome.removed_count);
    }

    #[test]
    fn repeated_section_collapses_to_one(copies in 2usize..6, p in 0usize..3) {
        let mut doc = String::new();
        for i in 0..copies {
            doc.push_str(&format!("## Heading {i}\n\n{}\n\n", PARAGRAPHS[p]));
        }
        let report = validate(&doc, &ValidateOptions { auto_fix: true, title: None });
        prop_assert_eq!(report.removed_count, copies - 1);
        let fixed = report.fixed_content.unwrap();
        prop_assert_eq!(fixed.matches(PARAGRAPHS[p]).count(), 1);
        prop_assert!(fixed.starts_with("## Heading 0"));
    }
}
