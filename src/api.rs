//! Decoding of the Prometheus HTTP API envelope.
//!
//! An instant query answers with:
//! ```json
//! {"status":"success","data":{"resultType":"vector","result":[
//!   {"metric":{"__name__":"up","instance":"web1","job":"node"},"value":[1700000000.123,"1"]}
//! ]}}
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub data: ResultData,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    pub result_type: String,
    pub result: Vec<Sample>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    /// `[timestamp, value]`
    #[serde(default)]
    pub value: Vec<Value>,
}

impl Sample {
    /// The sample value as text. Prometheus sends it as a JSON string; any
    /// other scalar is rendered through its JSON form.
    pub fn value_text(&self) -> Option<String> {
        match self.value.get(1)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl ApiResponse {
    pub fn first(&self) -> Option<&Sample> {
        self.data.result.first()
    }
}
