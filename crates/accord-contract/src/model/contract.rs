//! The contract aggregate.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::http::{Request, Response};
use super::messaging::{Input, OutputMessage};
use crate::error::ContractError;

/// What a contract describes: an HTTP exchange or a messaging exchange.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Interaction {
    Http {
        #[serde(skip_serializing_if = "Option::is_none")]
        request: Option<Request>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<Response>,
    },
    #[serde(rename_all = "camelCase")]
    Messaging {
        #[serde(skip_serializing_if = "Option::is_none")]
        input: Option<Input>,
        #[serde(skip_serializing_if = "Option::is_none")]
        output_message: Option<OutputMessage>,
    },
    /// Neither HTTP nor messaging sections were given.
    #[default]
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub interaction: Interaction,
    /// Filled in from the file name by [`crate::naming`] when absent.
    pub name: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    /// Lower numbers take precedence.
    pub priority: Option<u32>,
    pub ignored: bool,
    pub in_progress: bool,
    pub metadata: BTreeMap<String, Value>,
}

impl Contract {
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// The resolved name, or `""` before naming.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn is_http(&self) -> bool {
        matches!(self.interaction, Interaction::Http { .. })
    }

    pub fn is_messaging(&self) -> bool {
        matches!(self.interaction, Interaction::Messaging { .. })
    }

    pub fn request(&self) -> Option<&Request> {
        match &self.interaction {
            Interaction::Http { request, .. } => request.as_ref(),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match &self.interaction {
            Interaction::Http { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&Input> {
        match &self.interaction {
            Interaction::Messaging { input, .. } => input.as_ref(),
            _ => None,
        }
    }

    pub fn output_message(&self) -> Option<&OutputMessage> {
        match &self.interaction {
            Interaction::Messaging { output_message, .. } => output_message.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    name: Option<String>,
    label: Option<String>,
    description: Option<String>,
    priority: Option<u32>,
    ignored: bool,
    in_progress: bool,
    metadata: BTreeMap<String, Value>,
    request: Option<Request>,
    response: Option<Response>,
    input: Option<Input>,
    output_message: Option<OutputMessage>,
}

impl ContractBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    pub fn in_progress(mut self) -> Self {
        self.in_progress = true;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    pub fn response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }

    pub fn input(mut self, input: Input) -> Self {
        self.input = Some(input);
        self
    }

    pub fn output_message(mut self, output: OutputMessage) -> Self {
        self.output_message = Some(output);
        self
    }

    pub fn build(self) -> Result<Contract, ContractError> {
        let http = self.request.is_some() || self.response.is_some();
        let messaging = self.input.is_some() || self.output_message.is_some();

        let interaction = match (http, messaging) {
            (true, true) => {
                return Err(ContractError::definition(
                    "a contract cannot mix HTTP and messaging sections",
                ))
            }
            (true, false) => Interaction::Http {
                request: self.request,
                response: self.response,
            },
            (false, true) => Interaction::Messaging {
                input: self.input,
                output_message: self.output_message,
            },
            (false, false) => Interaction::Empty,
        };

        Ok(Contract {
            interaction,
            name: self.name,
            label: self.label,
            description: self.description,
            priority: self.priority,
            ignored: self.ignored,
            in_progress: self.in_progress,
            metadata: self.metadata,
        })
    }
}
