//! Testing utilities for the Folio workspace
//!
//! Shared fixtures and scripted collaborators for pipeline tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use folio_content::{
    render_markdown, Brief, BusinessInfo, ContextualVector, OutlineNode, Section, VisualSemantic,
};
use folio_core::{CancellationFlag, ContentGenerator, PassRequest, RuleEvaluator};
use folio_snapshot::{ContentHash, JobId, RuleSnapshot, RuleStatus, Severity, SnapshotKind};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

const TOPICS: [&str; 8] = [
    "Choosing a truing stand",
    "Spoke tension basics",
    "Lateral and radial true",
    "Dishing the wheel",
    "Common mistakes",
    "Tools you need",
    "Maintenance schedule",
    "When to replace a rim",
];

/// Builder for rule snapshots
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    job_id: JobId,
    pass: u32,
    kind: SnapshotKind,
    rules: BTreeMap<String, RuleStatus>,
    content: String,
}

impl SnapshotBuilder {
    pub fn new(job_id: &str, pass: u32) -> Self {
        Self {
            job_id: JobId::new(job_id),
            pass,
            kind: SnapshotKind::Before,
            rules: BTreeMap::new(),
            content: String::new(),
        }
    }

    pub fn after(mut self) -> Self {
        self.kind = SnapshotKind::After;
        self
    }

    pub fn passing(mut self, rule: &str, severity: Severity) -> Self {
        self.rules.insert(rule.to_string(), RuleStatus::pass(severity));
        self
    }

    pub fn failing(mut self, rule: &str, severity: Severity, violations: u32) -> Self {
        self.rules
            .insert(rule.to_string(), RuleStatus::fail(severity, violations));
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    pub fn build(self) -> RuleSnapshot {
        RuleSnapshot::for_content(self.job_id, self.pass, self.kind, self.rules, &self.content)
            .unwrap()
    }
}

/// Rule table with every listed rule passing
pub fn all_passing(rules: &[(&str, Severity)]) -> BTreeMap<String, RuleStatus> {
    rules
        .iter()
        .map(|(id, severity)| ((*id).to_string(), RuleStatus::pass(*severity)))
        .collect()
}

/// `n` distinct sections, the first one an introduction
pub fn sample_sections(n: usize) -> Vec<Section> {
    (0..n)
        .map(|i| {
            let topic = TOPICS[i % TOPICS.len()];
            let heading = if i == 0 {
                "Introduction".to_string()
            } else if i < TOPICS.len() {
                topic.to_string()
            } else {
                format!("{topic} part {i}")
            };
            let mut body = format!(
                "Section {i} explains {} for home mechanics who service their own bikes. \
                 A true wheel rolls straight, brakes evenly and keeps spoke tension balanced \
                 so the rim lasts for many seasons of riding.",
                topic.to_lowercase()
            );
            if i % 3 == 1 {
                body.push_str(&format!(
                    "\n\n- Check item {i}a\n- Check item {i}b\n- Check item {i}c"
                ));
            }
            let section = Section::new(format!("s{i}"), heading, body, i as u32);
            if i == 0 {
                section.introduction()
            } else {
                section
            }
        })
        .collect()
}

/// Brief matching [`sample_sections`]
pub fn sample_brief() -> Brief {
    Brief {
        title: "How to True a Bicycle Wheel".to_string(),
        meta_description: Some(
            "Step-by-step wheel truing for home mechanics, from spoke tension to dish."
                .to_string(),
        ),
        target_keyword: Some("true a bicycle wheel".to_string()),
        outline: vec![OutlineNode::new("Introduction", 2)
            .with_child(OutlineNode::new("Spoke tension basics", 3))],
        key_takeaways: vec!["Small turns, checked often".to_string()],
        contextual_vectors: vec![ContextualVector {
            subject_label: "Spoke tension".to_string(),
            heading: Some("Spoke tension basics".to_string()),
        }],
        visual_semantics: vec![VisualSemantic {
            description: "Wheel mounted in a truing stand".to_string(),
            alt_text: Some("Truing stand with wheel".to_string()),
            url: Some("https://example.com/stand.jpg".to_string()),
        }],
    }
}

pub fn sample_business() -> BusinessInfo {
    BusinessInfo {
        seed_keyword: Some("wheel truing".to_string()),
        brand_name: Some("Spoke & Hub".to_string()),
        domain: Some("spokeandhub.example".to_string()),
        language: Some("en".to_string()),
    }
}

/// Generator whose output is scripted per pass
///
/// Unscripted passes append a short revision note to the last section.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    replacements: HashMap<u32, Vec<Section>>,
    failures: Mutex<HashMap<u32, u32>>,
    cancel_after: Option<(u32, CancellationFlag)>,
    calls: Mutex<Vec<u32>>,
    summary_sizes: Mutex<Vec<usize>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `sections` verbatim at `pass`
    pub fn replace_at(mut self, pass: u32, sections: Vec<Section>) -> Self {
        self.replacements.insert(pass, sections);
        self
    }

    /// Fail the first `times` calls for `pass`
    pub fn fail_times(self, pass: u32, times: u32) -> Self {
        self.failures.lock().insert(pass, times);
        self
    }

    /// Set `flag` while generating `pass`
    pub fn cancel_after(mut self, pass: u32, flag: CancellationFlag) -> Self {
        self.cancel_after = Some((pass, flag));
        self
    }

    /// Pass numbers of every call, retries included
    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().clone()
    }

    /// Serialized summary size of every call
    pub fn summary_sizes(&self) -> Vec<usize> {
        self.summary_sizes.lock().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, request: &PassRequest) -> anyhow::Result<Vec<Section>> {
        let pass = request.pass_number;
        self.calls.lock().push(pass);
        self.summary_sizes
            .lock()
            .push(request.summary.serialized_len());

        {
            let mut failures = self.failures.lock();
            if let Some(remaining) = failures.get_mut(&pass) {
                if *remaining > 0 {
                    *remaining -= 1;
                    anyhow::bail!("scripted failure at pass {pass}");
                }
            }
        }

        if let Some((at, flag)) = &self.cancel_after {
            if *at == pass {
                flag.cancel();
            }
        }

        if let Some(sections) = self.replacements.get(&pass) {
            return Ok(sections.clone());
        }
        let mut sections = request.sections.clone();
        if let Some(last) = sections.last_mut() {
            last.content.push_str(&format!("\n\nRevision note {pass}."));
        }
        Ok(sections)
    }
}

/// Evaluator with rule outcomes scripted per pass
///
/// "Before" evaluations return the outcome last reported for identical
/// content, or the initial table. "After" evaluations return the table
/// scripted for the pass, or the outcome of that pass's "before" call.
#[derive(Debug)]
pub struct TableEvaluator {
    initial: BTreeMap<String, RuleStatus>,
    after: HashMap<u32, BTreeMap<String, RuleStatus>>,
    by_content: Mutex<HashMap<ContentHash, BTreeMap<String, RuleStatus>>>,
    last_before: Mutex<BTreeMap<String, RuleStatus>>,
    calls: Mutex<Vec<(u32, SnapshotKind)>>,
    failures: Mutex<u32>,
}

impl TableEvaluator {
    pub fn new(initial: BTreeMap<String, RuleStatus>) -> Self {
        Self {
            last_before: Mutex::new(initial.clone()),
            initial,
            after: HashMap::new(),
            by_content: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(0),
        }
    }

    /// Rules reported after `pass`
    pub fn after_pass(mut self, pass: u32, rules: BTreeMap<String, RuleStatus>) -> Self {
        self.after.insert(pass, rules);
        self
    }

    /// Fail the next `times` evaluations
    pub fn fail_times(self, times: u32) -> Self {
        *self.failures.lock() = times;
        self
    }

    pub fn calls(&self) -> Vec<(u32, SnapshotKind)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RuleEvaluator for TableEvaluator {
    async fn evaluate(
        &self,
        job_id: &JobId,
        pass_number: u32,
        kind: SnapshotKind,
        sections: &[Section],
    ) -> anyhow::Result<RuleSnapshot> {
        self.calls.lock().push((pass_number, kind));
        {
            let mut failures = self.failures.lock();
            if *failures > 0 {
                *failures -= 1;
                anyhow::bail!("scripted evaluation failure");
            }
        }

        let content = render_markdown(None, sections);
        let hash = ContentHash::compute(content.as_bytes());
        let rules = match kind {
            SnapshotKind::Before => {
                let rules = self
                    .by_content
                    .lock()
                    .get(&hash)
                    .cloned()
                    .unwrap_or_else(|| self.initial.clone());
                *self.last_before.lock() = rules.clone();
                rules
            }
            SnapshotKind::After => {
                let rules = self
                    .after
                    .get(&pass_number)
                    .cloned()
                    .unwrap_or_else(|| self.last_before.lock().clone());
                self.by_content.lock().insert(hash, rules.clone());
                rules
            }
        };
        Ok(RuleSnapshot::for_content(
            job_id.clone(),
            pass_number,
            kind,
            rules,
            &content,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_content::validate;

    #[test]
    fn sample_document_is_clean() {
        let content = render_markdown(Some(&sample_brief().title), &sample_sections(12));
        let report = validate(&content, &folio_content::ValidateOptions::default());
        assert!(report.valid, "{:?}", report.issues);
    }

    #[test]
    fn snapshot_builder_sets_kind_and_rules() {
        let snapshot = SnapshotBuilder::new("job", 2)
            .after()
            .passing("A1", Severity::Error)
            .failing("A2", Severity::Warning, 3)
            .build();
        assert_eq!(snapshot.kind(), SnapshotKind::After);
        assert_eq!(snapshot.passing_count(), 1);
        assert_eq!(snapshot.total_violations(), 3);
    }

    #[tokio::test]
    async fn table_evaluator_remembers_content() {
        let initial = all_passing(&[("A1", Severity::Warning)]);
        let mut fixed = initial.clone();
        fixed.insert("A2".to_string(), RuleStatus::pass(Severity::Error));
        let evaluator = TableEvaluator::new(initial).after_pass(1, fixed.clone());
        let job = JobId::new("job");
        let sections = sample_sections(2);

        let after = evaluator
            .evaluate(&job, 1, SnapshotKind::After, &sections)
            .await
            .unwrap();
        assert_eq!(after.rules(), &fixed);

        let before = evaluator
            .evaluate(&job, 2, SnapshotKind::Before, &sections)
            .await
            .unwrap();
        assert_eq!(before.rules(), &fixed);
    }
}
