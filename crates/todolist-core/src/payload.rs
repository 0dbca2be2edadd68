use serde::{Serialize, Serializer};

/// Argument to an entry function. `u64` goes over the wire as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveArg {
    U64(u64),
    String(String),
}

impl MoveArg {
    /// Typed form understood by `aptos move run --args`.
    pub fn cli_arg(&self) -> String {
        match self {
            Self::U64(v) => format!("u64:{v}"),
            Self::String(s) => format!("string:{s}"),
        }
    }
}

impl Serialize for MoveArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::U64(v) => serializer.serialize_str(&v.to_string()),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Transaction description handed to the wallet for signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<MoveArg>,
}

impl TransactionPayload {
    pub fn entry_function(function: String, arguments: Vec<MoveArg>) -> Self {
        Self {
            kind: "entry_function_payload",
            function,
            type_arguments: vec![],
            arguments,
        }
    }
}

/// Addresses of the `todolist` Move module published at `module_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub module_address: String,
}

impl Contract {
    pub const MODULE: &'static str = "todolist";

    pub fn new(module_address: impl Into<String>) -> Self {
        Self {
            module_address: module_address.into(),
        }
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}::{}::{}", self.module_address, Self::MODULE, name)
    }

    pub fn list_resource_type(&self) -> String {
        self.qualified("TodoList")
    }

    pub fn task_value_type(&self) -> String {
        self.qualified("Task")
    }

    pub fn create_list(&self) -> TransactionPayload {
        TransactionPayload::entry_function(self.qualified("create_list"), vec![])
    }

    pub fn create_task(&self, content: &str) -> TransactionPayload {
        TransactionPayload::entry_function(
            self.qualified("create_task"),
            vec![MoveArg::String(content.to_string())],
        )
    }

    pub fn complete_task(&self, task_id: u64) -> TransactionPayload {
        TransactionPayload::entry_function(
            self.qualified("complete_task"),
            vec![MoveArg::U64(task_id)],
        )
    }
}
