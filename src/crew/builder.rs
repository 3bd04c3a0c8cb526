//! Crew instantiation and wiring
//!
//! `CrewBuilder` turns template ids plus a topic into concrete agents and
//! tasks, and assembles them into one of four crew shapes. Substitution is
//! literal: every occurrence of the `{topic}` placeholder is replaced with
//! the topic string, nothing more.
//!
//! When document context is attached, agent goals/backstories get a constant
//! suffix and task descriptions are rebuilt around the verbatim document
//! text. The document text itself is never reworded or truncated.

use super::{Agent, Crew, CrewError, Process, Task};
use crate::templates::{TemplateStore, TOPIC_PLACEHOLDER};
use crate::tools;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Appended to an agent's goal when documents are supplied.
const AGENT_GOAL_NOTE: &str = " You have been given specific documentation that MUST be deeply \
analyzed and heavily weighted in all your outputs. Your primary responsibility is to extract, \
reference, and build upon the content from these provided documents.";

/// Appended to an agent's backstory when documents are supplied.
const AGENT_BACKSTORY_NOTE: &str = " You are currently working with user-provided documentation \
that contains critical information. You must treat these documents as your authoritative source, \
citing specific details and ensuring your analysis directly reflects their content.";

/// Sentinel lines framing the verbatim document text inside a task
/// description.
pub const DOCUMENTS_BEGIN: &str = "--- PROVIDED DOCUMENTS (ANALYZE THOROUGHLY) ---";
pub const DOCUMENTS_END: &str = "--- END DOCUMENTS ---";

/// Builds agents, tasks and crews from the template tables.
///
/// One builder per crew-build call; every build produces fresh instances
/// with no sharing across calls.
pub struct CrewBuilder {
    store: Arc<TemplateStore>,
    model: String,
    document_context: Option<String>,
    tools: Vec<String>,
}

impl CrewBuilder {
    pub fn new(store: Arc<TemplateStore>, model: impl Into<String>) -> Self {
        Self {
            store,
            model: model.into(),
            document_context: None,
            tools: tools::default_tool_names(),
        }
    }

    /// Attach caller-supplied reference documents.
    ///
    /// Whitespace-only text is treated as absent: no augmentation fires on
    /// content that trims to nothing.
    pub fn with_document_context(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.document_context = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    /// Override the default toolset handed to every agent.
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Instantiate an agent from its template.
    pub fn build_agent(&self, agent_id: &str, topic: &str) -> Result<Agent, CrewError> {
        let template = self
            .store
            .agent(agent_id)
            .ok_or_else(|| CrewError::UnknownAgentType(agent_id.to_string()))?;

        let role = template.role.replace(TOPIC_PLACEHOLDER, topic);
        let mut goal = template.goal.replace(TOPIC_PLACEHOLDER, topic);
        let mut backstory = template.backstory.replace(TOPIC_PLACEHOLDER, topic);

        // The notes are constant suffixes, not re-parameterized by topic.
        if self.document_context.is_some() {
            goal.push_str(AGENT_GOAL_NOTE);
            backstory.push_str(AGENT_BACKSTORY_NOTE);
        }

        Ok(Agent {
            id: agent_id.to_string(),
            role,
            goal,
            backstory,
            verbose: template.verbose,
            allow_delegation: template.allow_delegation,
            tools: self.tools.clone(),
        })
    }

    /// Instantiate a task from its template, bound to the agent at `agent`
    /// and fed by the tasks at `context` (indices into the crew under
    /// construction).
    pub fn build_task(
        &self,
        task_id: &str,
        topic: &str,
        agent: usize,
        context: Vec<usize>,
    ) -> Result<Task, CrewError> {
        let template = self
            .store
            .task(task_id)
            .ok_or_else(|| CrewError::UnknownTaskType(task_id.to_string()))?;

        let mut description = template.description.replace(TOPIC_PLACEHOLDER, topic);
        let mut expected_output = template.expected_output.replace(TOPIC_PLACEHOLDER, topic);

        if let Some(documents) = &self.document_context {
            description = compose_document_description(documents, &description);
            expected_output = extend_expected_output(&expected_output);
        }

        Ok(Task {
            id: task_id.to_string(),
            description,
            expected_output,
            agent,
            context,
        })
    }

    /// Research crew: researcher feeds a writer.
    pub fn research_crew(&self, topic: &str) -> Result<Crew, CrewError> {
        let researcher = self.build_agent("researcher", topic)?;
        let writer = self.build_agent("writer", topic)?;

        let research_task = self.build_task("research_task", topic, 0, vec![])?;
        let writing_task = self.build_task("writing_task", topic, 1, vec![0])?;

        Ok(Crew {
            agents: vec![researcher, writer],
            tasks: vec![research_task, writing_task],
            process: Process::Sequential,
            verbose: true,
        })
    }

    /// Analysis crew: researcher feeds an analyst.
    pub fn analysis_crew(&self, topic: &str) -> Result<Crew, CrewError> {
        let researcher = self.build_agent("researcher", topic)?;
        let analyst = self.build_agent("analyst", topic)?;

        let research_task = self.build_task("research_task", topic, 0, vec![])?;
        let analysis_task = self.build_task("analysis_task", topic, 1, vec![0])?;

        Ok(Crew {
            agents: vec![researcher, analyst],
            tasks: vec![research_task, analysis_task],
            process: Process::Sequential,
            verbose: true,
        })
    }

    /// Full crew: research fans out to writing and analysis, a coordinator
    /// synthesizes both.
    pub fn full_crew(&self, topic: &str) -> Result<Crew, CrewError> {
        let researcher = self.build_agent("researcher", topic)?;
        let writer = self.build_agent("writer", topic)?;
        let analyst = self.build_agent("analyst", topic)?;
        let coordinator = self.build_agent("coordinator", topic)?;

        let research_task = self.build_task("research_task", topic, 0, vec![])?;
        let writing_task = self.build_task("writing_task", topic, 1, vec![0])?;
        let analysis_task = self.build_task("analysis_task", topic, 2, vec![0])?;
        let synthesis_task = self.build_task("synthesis_task", topic, 3, vec![1, 2])?;

        Ok(Crew {
            agents: vec![researcher, writer, analyst, coordinator],
            tasks: vec![research_task, writing_task, analysis_task, synthesis_task],
            process: Process::Sequential,
            verbose: true,
        })
    }

    /// Custom crew from caller-supplied agent and task id lists.
    ///
    /// Agent ids are strict: an unknown agent id is an error. Task ids are
    /// lenient: unknown ids are skipped, and the context chain links each
    /// built task to the previously *built* one, so skipped ids never appear
    /// as context.
    pub fn custom_crew(
        &self,
        topic: &str,
        agent_ids: &[String],
        task_ids: &[String],
    ) -> Result<Crew, CrewError> {
        let mut agent_indices: IndexMap<String, usize> = IndexMap::new();
        let mut agents = Vec::new();
        for agent_id in agent_ids {
            if agent_indices.contains_key(agent_id) {
                continue;
            }
            let agent = self.build_agent(agent_id, topic)?;
            agent_indices.insert(agent_id.clone(), agents.len());
            agents.push(agent);
        }
        if agents.is_empty() {
            return Err(CrewError::EmptyCrew);
        }

        let mut tasks: Vec<Task> = Vec::new();
        for task_id in task_ids {
            let Some(template) = self.store.task(task_id) else {
                debug!(task = %task_id, "skipping unknown task type");
                continue;
            };

            // Executing agent: declared default if instantiated, else the
            // first requested agent id, else the first agent in insertion
            // order.
            let agent = template
                .agent
                .as_deref()
                .and_then(|id| agent_indices.get(id).copied())
                .or_else(|| {
                    agent_ids
                        .first()
                        .and_then(|id| agent_indices.get(id.as_str()).copied())
                })
                .unwrap_or(0);

            let context = match tasks.len() {
                0 => vec![],
                n => vec![n - 1],
            };
            let task = self.build_task(task_id, topic, agent, context)?;
            tasks.push(task);
        }

        Ok(Crew {
            agents,
            tasks,
            process: Process::Sequential,
            verbose: true,
        })
    }
}

fn compose_document_description(documents: &str, original: &str) -> String {
    format!(
        "CRITICAL PRIORITY - DOCUMENT-DRIVEN ANALYSIS REQUIRED\n\
\n\
The user has provided specific documentation that MUST be the foundation of your entire \
analysis. Your output quality will be judged primarily on how thoroughly you incorporate, \
reference, and reflect the content from these documents.\n\
\n\
=== MANDATORY REQUIREMENTS ===\n\
1. DEEP ANALYSIS: Read every section of the provided documents carefully. Extract specific \
facts, figures, quotes, and data points.\n\
2. HEAVY WEIGHTING: The documents are your PRIMARY source - weight their content 5x more \
heavily than any general knowledge.\n\
3. DIRECT REFERENCES: Your output MUST explicitly cite and reference specific information \
from the documents (e.g., \"According to the provided documentation...\", \"The uploaded \
materials indicate...\", \"As stated in [document name]...\").\n\
4. COMPREHENSIVE COVERAGE: Address ALL relevant topics, data, and insights found in the \
documents - do not cherry-pick.\n\
5. ACCURACY CHECK: Never contradict or ignore information in the provided documents. If \
there's ambiguity, note it and explain.\n\
\n\
{DOCUMENTS_BEGIN}\n\
{documents}\n\
{DOCUMENTS_END}\n\
\n\
ORIGINAL TASK:\n\
{original}\n\
\n\
FINAL REMINDER: Your analysis MUST demonstrate deep engagement with the uploaded documents. \
Generic responses that ignore the specific content provided will be considered failures. \
Quote, reference, and build upon the document content extensively."
    )
}

fn extend_expected_output(original: &str) -> String {
    format!(
        "{original}\n\
\n\
CRITICAL: Your output must include:\n\
- Direct quotes or specific data points from the provided documents\n\
- Clear references to document sources (e.g., \"As detailed in the uploaded documentation...\")\n\
- Analysis that builds upon and extends the information in the documents\n\
- No generic statements that could apply without having read the documents"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateStore;

    fn builder() -> CrewBuilder {
        let store = Arc::new(TemplateStore::builtin().unwrap());
        CrewBuilder::new(store, "gpt-4o-mini")
    }

    #[test]
    fn build_agent_substitutes_every_placeholder() {
        let b = builder();
        let store = TemplateStore::builtin().unwrap();
        for id in store.agent_ids().collect::<Vec<_>>() {
            let agent = b.build_agent(id, "rust async runtimes").unwrap();
            for field in [&agent.role, &agent.goal, &agent.backstory] {
                assert!(!field.contains(TOPIC_PLACEHOLDER), "{id} left a placeholder");
                assert!(field.contains("rust async runtimes"), "{id} lost the topic");
            }
        }
    }

    #[test]
    fn build_agent_replaces_repeated_placeholders() {
        let b = builder();
        // backstories mention the topic mid-sentence as well
        let agent = b.build_agent("researcher", "qzx17").unwrap();
        assert!(agent.backstory.contains("qzx17"));
        assert!(!agent.backstory.contains("{topic}"));
    }

    #[test]
    fn unknown_agent_id_is_loud() {
        let err = builder().build_agent("chef", "t").unwrap_err();
        assert!(matches!(err, CrewError::UnknownAgentType(id) if id == "chef"));
    }

    #[test]
    fn unknown_task_id_is_loud() {
        let err = builder().build_task("cook_task", "t", 0, vec![]).unwrap_err();
        assert!(matches!(err, CrewError::UnknownTaskType(id) if id == "cook_task"));
    }

    #[test]
    fn document_context_extends_agent_fields() {
        let store = Arc::new(TemplateStore::builtin().unwrap());
        let plain = CrewBuilder::new(store.clone(), "m")
            .build_agent("researcher", "solar power")
            .unwrap();
        let augmented = CrewBuilder::new(store, "m")
            .with_document_context("Q3 report: output doubled.")
            .build_agent("researcher", "solar power")
            .unwrap();

        assert_eq!(plain.role, augmented.role);
        assert!(augmented.goal.starts_with(&plain.goal));
        assert!(augmented.goal.len() > plain.goal.len());
        assert!(augmented.backstory.starts_with(&plain.backstory));
        assert!(augmented.goal.contains("heavily weighted"));
        assert!(augmented.backstory.contains("authoritative source"));
        // the note is a constant suffix, not topic-parameterized
        assert!(!augmented.goal[plain.goal.len()..].contains("solar power"));
    }

    #[test]
    fn document_text_survives_verbatim_between_sentinels() {
        let documents = "Line one.\n\nLine two with {topic} braces and \"quotes\".";
        let store = Arc::new(TemplateStore::builtin().unwrap());
        let task = CrewBuilder::new(store, "m")
            .with_document_context(documents)
            .build_task("research_task", "anything", 0, vec![])
            .unwrap();

        let open = format!("{DOCUMENTS_BEGIN}\n");
        let close = format!("\n{DOCUMENTS_END}");
        let start = task.description.find(&open).expect("open sentinel") + open.len();
        let end = task.description.find(&close).expect("close sentinel");
        assert_eq!(&task.description[start..end], documents);
    }

    #[test]
    fn document_task_keeps_original_description_and_extends_output() {
        let store = Arc::new(TemplateStore::builtin().unwrap());
        let plain = CrewBuilder::new(store.clone(), "m")
            .build_task("research_task", "wind farms", 0, vec![])
            .unwrap();
        let augmented = CrewBuilder::new(store, "m")
            .with_document_context("doc body")
            .build_task("research_task", "wind farms", 0, vec![])
            .unwrap();

        assert!(augmented.description.contains("ORIGINAL TASK:"));
        assert!(augmented.description.contains(&plain.description));
        assert!(augmented.expected_output.starts_with(&plain.expected_output));
        assert!(augmented
            .expected_output
            .contains("Direct quotes or specific data points"));
    }

    #[test]
    fn whitespace_document_context_is_ignored() {
        let store = Arc::new(TemplateStore::builtin().unwrap());
        let plain = CrewBuilder::new(store.clone(), "m")
            .build_agent("writer", "t")
            .unwrap();
        let noop = CrewBuilder::new(store, "m")
            .with_document_context("  \n\t ")
            .build_agent("writer", "t")
            .unwrap();
        assert_eq!(plain.goal, noop.goal);
        assert_eq!(plain.backstory, noop.backstory);
    }

    #[test]
    fn research_crew_shape() {
        let crew = builder().research_crew("topic").unwrap();
        assert_eq!(
            crew.agents.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            ["researcher", "writer"]
        );
        assert_eq!(
            crew.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            ["research_task", "writing_task"]
        );
        assert_eq!(crew.tasks[0].context, Vec::<usize>::new());
        assert_eq!(crew.tasks[1].context, vec![0]);
        assert_eq!(crew.process, Process::Sequential);
    }

    #[test]
    fn analysis_crew_shape() {
        let crew = builder().analysis_crew("topic").unwrap();
        assert_eq!(
            crew.agents.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            ["researcher", "analyst"]
        );
        assert_eq!(crew.tasks[1].id, "analysis_task");
        assert_eq!(crew.tasks[1].context, vec![0]);
    }

    #[test]
    fn full_crew_shape() {
        let crew = builder().full_crew("topic").unwrap();
        assert_eq!(crew.agents.len(), 4);
        assert_eq!(crew.tasks.len(), 4);
        // research feeds writing and analysis; synthesis consumes both
        assert_eq!(crew.tasks[1].context, vec![0]);
        assert_eq!(crew.tasks[2].context, vec![0]);
        assert_eq!(crew.tasks[3].context, vec![1, 2]);
        // every task's agent index is in bounds and context points backwards
        for (i, task) in crew.tasks.iter().enumerate() {
            assert!(task.agent < crew.agents.len());
            assert!(task.context.iter().all(|&c| c < i));
        }
    }

    #[test]
    fn fixed_crews_fail_loudly_on_missing_template() {
        // a store whose tables lack the writer agent and the writing task
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("agents.yaml"),
            "researcher:\n  role: \"R {topic}\"\n  goal: \"G {topic}\"\n  backstory: \"B {topic}\"\n",
        )
        .unwrap();
        let store = Arc::new(TemplateStore::load(Some(dir.path())).unwrap());
        let b = CrewBuilder::new(store, "m");

        assert!(matches!(
            b.research_crew("t"),
            Err(CrewError::UnknownAgentType(id)) if id == "writer"
        ));
        assert!(matches!(
            b.analysis_crew("t"),
            Err(CrewError::UnknownAgentType(id)) if id == "analyst"
        ));
        assert!(matches!(
            b.full_crew("t"),
            Err(CrewError::UnknownAgentType(_))
        ));
    }

    #[test]
    fn fixed_crews_fail_loudly_on_missing_task_template() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tasks.yaml"),
            "research_task:\n  description: \"D {topic}\"\n  expected_output: \"E {topic}\"\n",
        )
        .unwrap();
        let store = Arc::new(TemplateStore::load(Some(dir.path())).unwrap());
        let b = CrewBuilder::new(store, "m");

        assert!(matches!(
            b.research_crew("t"),
            Err(CrewError::UnknownTaskType(id)) if id == "writing_task"
        ));
        assert!(matches!(
            b.full_crew("t"),
            Err(CrewError::UnknownTaskType(_))
        ));
    }

    #[test]
    fn custom_crew_skips_unknown_tasks_and_chains_built_ones() {
        let b = builder();
        let agents = vec!["researcher".to_string(), "writer".to_string()];
        let tasks = vec![
            "research_task".to_string(),
            "no_such_task".to_string(),
            "writing_task".to_string(),
        ];
        let crew = b.custom_crew("t", &agents, &tasks).unwrap();

        assert_eq!(
            crew.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            ["research_task", "writing_task"]
        );
        // writing_task's context is the built research_task, not the skipped id
        assert_eq!(crew.tasks[1].context, vec![0]);
        assert_eq!(crew.tasks[0].context, Vec::<usize>::new());
    }

    #[test]
    fn custom_crew_is_strict_about_agent_ids() {
        let b = builder();
        let err = b
            .custom_crew(
                "t",
                &["researcher".to_string(), "pilot".to_string()],
                &["research_task".to_string()],
            )
            .unwrap_err();
        assert!(matches!(err, CrewError::UnknownAgentType(id) if id == "pilot"));
    }

    #[test]
    fn custom_crew_resolves_declared_default_agent() {
        let b = builder();
        let agents = vec!["researcher".to_string(), "analyst".to_string()];
        let crew = b
            .custom_crew(
                "t",
                &agents,
                &["research_task".to_string(), "analysis_task".to_string()],
            )
            .unwrap();

        // analysis_task declares analyst as its default agent
        assert_eq!(crew.agents[crew.tasks[1].agent].id, "analyst");
        assert_eq!(crew.agents[crew.tasks[0].agent].id, "researcher");
    }

    #[test]
    fn custom_crew_falls_back_to_first_requested_agent() {
        let b = builder();
        // writing_task declares writer, which is not instantiated here, so the
        // first requested agent executes it
        let agents = vec!["analyst".to_string(), "researcher".to_string()];
        let crew = b
            .custom_crew("t", &agents, &["writing_task".to_string()])
            .unwrap();
        assert_eq!(crew.agents[crew.tasks[0].agent].id, "analyst");
    }

    #[test]
    fn custom_crew_with_task_lacking_default_agent() {
        // task_b declares no agent: it resolves to the first requested agent,
        // and its context is the previously *built* task, not the skipped id
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tasks.yaml"),
            "task_a:\n  description: \"A {topic}\"\n  expected_output: \"AO {topic}\"\n  agent: researcher\n\
             task_b:\n  description: \"B {topic}\"\n  expected_output: \"BO {topic}\"\n",
        )
        .unwrap();
        let store = Arc::new(TemplateStore::load(Some(dir.path())).unwrap());
        let b = CrewBuilder::new(store, "m");

        let crew = b
            .custom_crew(
                "t",
                &["writer".to_string(), "researcher".to_string()],
                &[
                    "task_a".to_string(),
                    "ghost_task".to_string(),
                    "task_b".to_string(),
                ],
            )
            .unwrap();

        assert_eq!(
            crew.tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            ["task_a", "task_b"]
        );
        // task_a keeps its declared default agent
        assert_eq!(crew.agents[crew.tasks[0].agent].id, "researcher");
        // task_b falls back to the first requested agent
        assert_eq!(crew.agents[crew.tasks[1].agent].id, "writer");
        assert_eq!(crew.tasks[1].context, vec![0]);
    }

    #[test]
    fn custom_crew_without_agents_is_an_error() {
        let b = builder();
        let err = b
            .custom_crew("t", &[], &["research_task".to_string()])
            .unwrap_err();
        assert!(matches!(err, CrewError::EmptyCrew));
    }

    #[test]
    fn custom_crew_dedupes_repeated_agent_ids() {
        let b = builder();
        let agents = vec!["researcher".to_string(), "researcher".to_string()];
        let crew = b
            .custom_crew("t", &agents, &["research_task".to_string()])
            .unwrap();
        assert_eq!(crew.agents.len(), 1);
    }

    #[test]
    fn agents_carry_default_toolset() {
        let agent = builder().build_agent("researcher", "t").unwrap();
        assert_eq!(
            agent.tools,
            vec![
                "format_data",
                "generate_summary",
                "extract_bullet_points",
                "score_priority"
            ]
        );
    }

    #[test]
    fn tool_override_replaces_default_toolset() {
        let store = Arc::new(TemplateStore::builtin().unwrap());
        let agent = CrewBuilder::new(store, "m")
            .with_tools(vec!["generate_summary".to_string()])
            .build_agent("writer", "t")
            .unwrap();
        assert_eq!(agent.tools, vec!["generate_summary"]);
    }
}
