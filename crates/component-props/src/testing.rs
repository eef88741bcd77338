//! In-memory scene host for engine and dispatcher tests.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Mutex;

use crate::error::{HostError, HostResult};
use crate::host::{HostBridge, HostCall, QUERY_NODE, SET_COMPONENT_PROPERTY};

/// Scene graph held in memory, answering `query-node` and applying
/// `set-component-property` to the stored dump
pub struct FakeScene {
    nodes: Mutex<Map<String, Value>>,
    calls: Mutex<Vec<HostCall>>,
    frozen: bool,
}

impl FakeScene {
    pub fn new() -> Self {
        Self {
            nodes: Mutex::new(Map::new()),
            calls: Mutex::new(Vec::new()),
            frozen: false,
        }
    }

    /// Add a node carrying `components`
    pub fn with_node(self, node_id: &str, components: Vec<Value>) -> Self {
        self.nodes.lock().unwrap().insert(
            node_id.to_string(),
            json!({
                "uuid": {"value": node_id},
                "__comps__": components,
            }),
        );
        self
    }

    /// Accept writes without applying them, like a host that never commits
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == SET_COMPONENT_PROPERTY)
            .collect()
    }

    /// Current value of a wrapped property
    pub fn value_of(&self, node_id: &str, component_type: &str, property: &str) -> Option<Value> {
        let nodes = self.nodes.lock().unwrap();
        nodes
            .get(node_id)?
            .get("__comps__")?
            .as_array()?
            .iter()
            .find(|c| c["__type__"] == component_type)?
            .pointer(&format!("/value/{}/value", property))
            .cloned()
    }

    fn apply(&self, args: &[Value]) -> HostResult<Value> {
        let rejected = |message: &str| Ok(json!({"success": false, "error": message}));

        let (Some(node_id), Some(component_type), Some(property), Some(value)) = (
            args.first().and_then(Value::as_str),
            args.get(1).and_then(Value::as_str),
            args.get(2).and_then(Value::as_str),
            args.get(3),
        ) else {
            return rejected("malformed arguments");
        };

        if self.frozen {
            return Ok(json!({"success": true}));
        }

        let mut nodes = self.nodes.lock().unwrap();
        let slot = nodes
            .get_mut(node_id)
            .and_then(|n| n.get_mut("__comps__"))
            .and_then(Value::as_array_mut)
            .and_then(|comps| comps.iter_mut().find(|c| c["__type__"] == component_type))
            .and_then(|c| c.pointer_mut(&format!("/value/{}/value", property)));

        match slot {
            Some(slot) => {
                *slot = value.clone();
                Ok(json!({"success": true}))
            }
            None => rejected("no such property"),
        }
    }
}

#[async_trait]
impl HostBridge for FakeScene {
    async fn call(&self, call: HostCall) -> HostResult<Value> {
        self.calls.lock().unwrap().push(call.clone());

        match call.method.as_str() {
            QUERY_NODE => {
                let node_id = call.args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(self
                    .nodes
                    .lock()
                    .unwrap()
                    .get(node_id)
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            SET_COMPONENT_PROPERTY => self.apply(&call.args),
            _ => Err(HostError::Call {
                module: call.module,
                method: call.method,
                message: "unknown method".into(),
            }),
        }
    }
}

/// Raw component in the host's dump shape
pub fn component(component_type: &str, scene_id: &str, properties: Value) -> Value {
    let mut envelope = properties.as_object().cloned().unwrap_or_default();
    envelope.insert("uuid".into(), json!({"value": scene_id}));
    envelope.insert("enabled".into(), json!({"value": true}));
    json!({"__type__": component_type, "value": envelope})
}

/// Wrapped property descriptor
pub fn prop(value: Value, host_type: &str) -> Value {
    json!({"value": value, "type": host_type, "readonly": false})
}

/// Node `node-a` with a sprite and a label, node `node-b` hosting label `L1`,
/// node `node-c` with a button whose `label` references a `cc.Label` and
/// node `node-d` with a label carrying a font name and untyped metadata
pub fn demo_scene() -> FakeScene {
    FakeScene::new()
        .with_node(
            "node-a",
            vec![
                component(
                    "cc.Sprite",
                    "S1",
                    json!({
                        "color": prop(json!({"r": 255, "g": 255, "b": 255, "a": 255}), "cc.Color"),
                        "spriteFrame": prop(json!({"uuid": "frame-1"}), "cc.SpriteFrame"),
                        "sizeMode": prop(json!(1), "Enum")
                    }),
                ),
                component(
                    "cc.Label",
                    "LA",
                    json!({
                        "string": prop(json!("Hello"), "String"),
                        "fontSize": prop(json!(40), "Number")
                    }),
                ),
            ],
        )
        .with_node(
            "node-b",
            vec![
                component("cc.UITransform", "T1", json!({
                    "priority": prop(json!(0), "Number")
                })),
                component("cc.Label", "L1", json!({
                    "string": prop(json!("Target"), "String")
                })),
            ],
        )
        .with_node(
            "node-c",
            vec![component(
                "cc.Button",
                "B1",
                json!({
                    "interactable": prop(json!(true), "Boolean"),
                    "label": prop(Value::Null, "cc.Label"),
                    "target": {"value": null, "readonly": false, "extends": ["cc.Component"]}
                }),
            )],
        )
        .with_node(
            "node-d",
            vec![component(
                "cc.Label",
                "LD",
                json!({
                    "fontFamily": prop(json!("Arial"), "String"),
                    "metadata": prop(json!({"author": "ui", "revision": 2}), "Object")
                }),
            )],
        )
}
