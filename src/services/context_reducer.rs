//! Projection of the full result map to the synthesis context.

use serde_json::Value;

use crate::domain::models::{ContextSources, Location, ResultMap, SynthesisContext};

/// Keys tried, in order, for an object detection's label.
const OBJECT_LABEL_KEYS: [&str; 3] = ["label", "class_name", "label_en"];

/// Pure reducer from worker results to [`SynthesisContext`].
#[derive(Debug, Clone, Default)]
pub struct ContextReducer {
    sources: ContextSources,
}

impl ContextReducer {
    pub fn new(sources: ContextSources) -> Self {
        Self { sources }
    }

    /// Build the context. Missing, failed or oddly shaped sources yield
    /// empty fields, never an error.
    pub fn reduce(&self, results: &ResultMap) -> SynthesisContext {
        SynthesisContext {
            biometrics: array_at(results, &self.sources.biometrics, "/matches"),
            objects: array_at(results, &self.sources.objects, "/detections")
                .iter()
                .filter_map(object_label)
                .collect(),
            ocr: array_at(results, &self.sources.ocr, "/text"),
            location: location(results, &self.sources.location),
            cctv: array_at(results, &self.sources.cctv, "/cameras"),
        }
    }
}

fn array_at(results: &ResultMap, worker: &str, pointer: &str) -> Vec<Value> {
    results
        .get(worker)
        .and_then(|r| r.resolve(pointer))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn object_label(detection: &Value) -> Option<String> {
    OBJECT_LABEL_KEYS
        .iter()
        .find_map(|key| detection.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn location(results: &ResultMap, worker: &str) -> Option<Location> {
    let result = results.get(worker)?;
    let lat = result.field("lat")?.clone();
    let lng = result.field("lng")?.clone();
    Some(Location { lat, lng })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Payload, WorkerResult};
    use serde_json::json;

    fn ok(value: Value) -> WorkerResult {
        let payload: Payload = serde_json::from_value(value).unwrap();
        WorkerResult::ok(payload)
    }

    fn full_results() -> ResultMap {
        let mut results = ResultMap::new();
        results.insert("gps".into(), ok(json!({"lat": 24.7, "lng": 46.6})));
        results.insert(
            "biometrics".into(),
            ok(json!({"matches": [{"name": "A", "confidence": 0.9}]})),
        );
        results.insert(
            "object_detection".into(),
            ok(json!({"detections": [
                {"label": "Gun"},
                {"class_name": "Mask"},
                {"label_en": "Car", "label_ar": "x"},
                {"confidence": 0.3}
            ]})),
        );
        results.insert("ocr_environment".into(), ok(json!({"text": ["SHOP 12"]})));
        results.insert("cctv_retrieval".into(), ok(json!({"cameras": [{"id": "CAM-01"}]})));
        results
    }

    #[test]
    fn test_reduce_full_results() {
        let ctx = ContextReducer::default().reduce(&full_results());
        assert_eq!(ctx.objects, vec!["Gun", "Mask", "Car"]);
        assert_eq!(
            ctx.location,
            Some(Location {
                lat: json!(24.7),
                lng: json!(46.6)
            })
        );
        assert_eq!(ctx.biometrics.len(), 1);
        assert_eq!(ctx.ocr, vec![json!("SHOP 12")]);
        assert_eq!(ctx.cctv[0]["id"], "CAM-01");
    }

    #[test]
    fn test_failed_sources_are_empty() {
        let mut results = full_results();
        results.insert("gps".into(), WorkerResult::error("Empty output"));
        results.insert("cctv_retrieval".into(), WorkerResult::skipped("Missing prerequisite"));
        results.insert("ocr_environment".into(), ok(json!({"text": "not a list"})));

        let ctx = ContextReducer::default().reduce(&results);
        assert!(ctx.location.is_none());
        assert!(ctx.cctv.is_empty());
        assert!(ctx.ocr.is_empty());
        assert_eq!(ctx.objects.len(), 3);
    }

    #[test]
    fn test_location_needs_both_coordinates() {
        let mut results = ResultMap::new();
        results.insert("gps".into(), ok(json!({"lat": 24.7})));
        assert!(ContextReducer::default().reduce(&results).location.is_none());

        results.insert("gps".into(), ok(json!({"lat": 24.7, "lng": null})));
        assert!(ContextReducer::default().reduce(&results).location.is_none());
    }

    #[test]
    fn test_string_coordinates_pass_through() {
        let mut results = ResultMap::new();
        results.insert("gps".into(), ok(json!({"lat": "24.7136", "lng": "46.6753"})));
        let ctx = ContextReducer::default().reduce(&results);
        assert_eq!(
            ctx.location,
            Some(Location {
                lat: json!("24.7136"),
                lng: json!("46.6753")
            })
        );
    }

    #[test]
    fn test_location_agrees_with_dependency_gate() {
        use crate::domain::models::PipelineDefinition;
        use crate::services::dependency_gate::{evaluate, GateDecision};
        use std::path::Path;

        let def = PipelineDefinition::standard();
        let cctv = def.worker("cctv_retrieval").unwrap();
        for gps in [
            json!({"lat": 24.7, "lng": 46.6}),
            json!({"lat": "24.7", "lng": "46.6"}),
            json!({"lat": 0, "lng": 0}),
            json!({"lat": 24.7, "lng": null}),
            json!({"lat": 24.7}),
            json!({"lat": true, "lng": [1]}),
        ] {
            let mut results = ResultMap::new();
            results.insert("gps".into(), ok(gps.clone()));
            let gated = matches!(
                evaluate(cctv, def.edges_for("cctv_retrieval"), &results, Path::new("/a.jpg")),
                GateDecision::Run(_)
            );
            let located = ContextReducer::default().reduce(&results).location.is_some();
            assert_eq!(gated, located, "disagree on {gps}");
        }
    }

    #[test]
    fn test_custom_sources() {
        let sources = ContextSources {
            location: "geo".to_string(),
            ..ContextSources::default()
        };
        let mut results = ResultMap::new();
        results.insert("geo".into(), ok(json!({"lat": 1.0, "lng": 2.0})));
        let ctx = ContextReducer::new(sources).reduce(&results);
        assert_eq!(
            ctx.location,
            Some(Location {
                lat: json!(1.0),
                lng: json!(2.0)
            })
        );
    }

    #[test]
    fn test_empty_results() {
        assert!(ContextReducer::default().reduce(&ResultMap::new()).is_empty());
    }
}
