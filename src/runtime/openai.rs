//! OpenAI-compatible crew runtime
//!
//! Each task runs as its own persona-scoped conversation: the agent's
//! role/goal/backstory becomes the system message, the task description plus
//! the outputs of its context tasks become the user message. The agent's
//! tools are offered as chat function tools and executed locally; the loop
//! per task is bounded so a model that keeps calling tools cannot spin
//! forever. One failed call fails the whole run - no retries.

use super::{CrewRuntime, RuntimeError};
use crate::config::LlmConfig;
use crate::crew::{Agent, Crew, Task};
use crate::tool::ToolRegistry;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Upper bound on tool-call rounds within a single task. A loop guard, not a
/// retry policy.
const MAX_TOOL_TURNS: usize = 8;

pub struct OpenAiRuntime {
    client: Client<OpenAIConfig>,
    model: String,
    tools: ToolRegistry,
}

impl OpenAiRuntime {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        tools: ToolRegistry,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(base_url.into());

        Self {
            client: Client::with_config(config),
            model: model.into(),
            tools,
        }
    }

    /// Build a runtime from the service LLM config, resolving the API key
    /// from the configured environment variable (a `.env` file is honored).
    pub fn from_config(
        llm: &LlmConfig,
        model: &str,
        tools: ToolRegistry,
    ) -> Result<Self, RuntimeError> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var(&llm.api_key_env)
            .map_err(|_| RuntimeError::Request(format!("{} not set", llm.api_key_env)))?;
        Ok(Self::new(llm.base_url.as_str(), api_key, model, tools))
    }

    fn persona_prompt(agent: &Agent) -> String {
        format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            agent.role, agent.backstory, agent.goal
        )
    }

    fn task_prompt(
        crew: &Crew,
        task: &Task,
        outputs: &[String],
        inputs: &HashMap<String, String>,
    ) -> String {
        let mut prompt = String::new();

        if !inputs.is_empty() {
            prompt.push_str("Additional inputs:\n");
            let mut keys: Vec<&String> = inputs.keys().collect();
            keys.sort();
            for key in keys {
                prompt.push_str(&format!("- {}: {}\n", key, inputs[key]));
            }
            prompt.push('\n');
        }

        for &index in &task.context {
            prompt.push_str(&format!(
                "Context from task '{}':\n{}\n\n",
                crew.tasks[index].id, outputs[index]
            ));
        }

        prompt.push_str(&task.description);
        prompt.push_str(&format!("\n\nExpected output: {}", task.expected_output));
        prompt
    }

    async fn run_task(
        &self,
        crew: &Crew,
        task: &Task,
        outputs: &[String],
        inputs: &HashMap<String, String>,
    ) -> Result<String, RuntimeError> {
        let agent = crew.agent_for(task);
        let tool_defs: Vec<ChatCompletionTool> =
            self.tools.to_openai_tools(Some(&agent.tools));

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::persona_prompt(agent))
                .build()
                .map_err(|e| RuntimeError::Request(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::task_prompt(crew, task, outputs, inputs))
                .build()
                .map_err(|e| RuntimeError::Request(e.to_string()))?
                .into(),
        ];

        for _turn in 0..MAX_TOOL_TURNS {
            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(self.model.as_str())
                .messages(messages.clone());
            if !tool_defs.is_empty() {
                request.tools(tool_defs.clone());
            }
            let request = request
                .build()
                .map_err(|e| RuntimeError::Request(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| RuntimeError::Api(e.to_string()))?;

            let message = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| RuntimeError::EmptyResponse(task.id.clone()))?
                .message;

            if let Some(tool_calls) = message
                .tool_calls
                .filter(|calls| !calls.is_empty())
            {
                let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
                assistant.tool_calls(tool_calls.clone());
                if let Some(content) = message.content {
                    assistant.content(content);
                }
                messages.push(
                    assistant
                        .build()
                        .map_err(|e| RuntimeError::Request(e.to_string()))?
                        .into(),
                );

                for call in tool_calls {
                    let args = serde_json::from_str(&call.function.arguments)
                        .unwrap_or(serde_json::Value::Null);
                    let result = self.tools.execute(&call.function.name, args);
                    debug!(
                        tool = %call.function.name,
                        is_error = result.is_error,
                        "tool call"
                    );
                    messages.push(
                        ChatCompletionRequestToolMessageArgs::default()
                            .content(result.output)
                            .tool_call_id(call.id)
                            .build()
                            .map_err(|e| RuntimeError::Request(e.to_string()))?
                            .into(),
                    );
                }
                continue;
            }

            return match message.content {
                Some(content) if !content.trim().is_empty() => Ok(content),
                _ => Err(RuntimeError::EmptyResponse(task.id.clone())),
            };
        }

        warn!(task = %task.id, "tool-call turn limit reached");
        Err(RuntimeError::ToolLimit(task.id.clone()))
    }
}

#[async_trait]
impl CrewRuntime for OpenAiRuntime {
    async fn kickoff(
        &self,
        crew: &Crew,
        inputs: &HashMap<String, String>,
    ) -> Result<String, RuntimeError> {
        let mut outputs: Vec<String> = Vec::with_capacity(crew.tasks.len());

        for task in &crew.tasks {
            let agent = crew.agent_for(task);
            info!(task = %task.id, agent = %agent.id, model = %self.model, "running task");
            let output = self.run_task(crew, task, &outputs, inputs).await?;
            debug!(task = %task.id, chars = output.len(), "task complete");
            outputs.push(output);
        }

        Ok(outputs.pop().unwrap_or_default().trim().to_string())
    }
}
