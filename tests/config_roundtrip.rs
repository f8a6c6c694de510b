use detpost::{
    DetPostError, EngineConfig, ImageSize, PostProcessor, Precision, PriorBoxEngine, PriorStore,
    RefineDetectEngine,
};

fn sample_configs() -> Vec<EngineConfig> {
    vec![
        EngineConfig::default(),
        EngineConfig {
            num_classes: 91,
            background_class: Some(0),
            keep_topk: 100,
            pre_nms_top_k: 1000,
            score_threshold: 0.0,
            iou_threshold: 0.5,
            image_size: ImageSize { width: 1344, height: 832, channels: 3 },
            reg_weights: Some([10.0, 10.0, 5.0, 5.0]),
            ..EngineConfig::default()
        },
        EngineConfig {
            num_classes: 21,
            background_class: Some(0),
            keep_topk: 200,
            pre_nms_top_k: 400,
            score_threshold: 0.01,
            iou_threshold: 0.45,
            image_size: ImageSize { width: 300, height: 300, channels: 3 },
            precision: Precision::Fp16,
            score_bits: Some(10),
            ..EngineConfig::default()
        },
        EngineConfig {
            num_classes: 2,
            keep_topk: 1,
            score_threshold: 1.0,
            iou_threshold: 0.0,
            score_bits: Some(0),
            ..EngineConfig::default()
        },
        EngineConfig {
            num_classes: 3,
            keep_topk: 10,
            score_bits: Some(22),
            ..EngineConfig::default()
        },
    ]
}

#[test]
fn every_valid_config_round_trips_exactly() {
    for cfg in sample_configs() {
        let bytes = cfg.to_bytes();
        assert_eq!(bytes.len(), cfg.serialized_len());
        let restored = EngineConfig::from_bytes(&bytes).unwrap();
        assert_eq!(restored, cfg);
    }
}

#[test]
fn engine_to_bytes_matches_config_bytes() {
    for cfg in sample_configs() {
        let engine = RefineDetectEngine::new(cfg.clone()).unwrap();
        assert_eq!(engine.to_bytes(), cfg.to_bytes());

        let priors = PriorStore::from_corners(&[0.1, 0.1, 0.9, 0.9]).unwrap();
        let engine = PriorBoxEngine::new(cfg.clone(), priors).unwrap();
        assert_eq!(engine.to_bytes(), cfg.to_bytes());
    }
}

#[test]
fn restored_engine_preserves_config() {
    let cfg = sample_configs().remove(1);
    let engine = RefineDetectEngine::new(cfg.clone()).unwrap();
    let restored = RefineDetectEngine::from_bytes(&engine.to_bytes()).unwrap();
    assert_eq!(restored.config(), &cfg);
}

#[test]
fn namespace_tag_is_carried_but_not_serialized() {
    let mut engine = RefineDetectEngine::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.namespace(), "");
    engine.set_namespace("detector/instance-3");
    assert_eq!(engine.namespace(), "detector/instance-3");

    let copy = engine.clone();
    assert_eq!(copy.namespace(), "detector/instance-3");

    let restored = RefineDetectEngine::from_bytes(&engine.to_bytes()).unwrap();
    assert_eq!(restored.namespace(), "");
}

#[test]
fn construction_rejects_invalid_configs() {
    let bad = EngineConfig { iou_threshold: -0.1, ..EngineConfig::default() };
    assert_eq!(
        RefineDetectEngine::new(bad).unwrap_err(),
        DetPostError::InvalidThreshold { name: "iou_threshold", value: -0.1 }
    );

    let bad = EngineConfig { keep_topk: 0, ..EngineConfig::default() };
    let priors = PriorStore::from_corners(&[0.0, 0.0, 1.0, 1.0]).unwrap();
    assert_eq!(
        PriorBoxEngine::new(bad, priors).unwrap_err(),
        DetPostError::InvalidCount { name: "keep_topk" }
    );

    let bad = EngineConfig { score_bits: Some(23), ..EngineConfig::default() };
    assert_eq!(
        RefineDetectEngine::new(bad).unwrap_err(),
        DetPostError::InvalidScoreBits { bits: 23 }
    );
}

#[test]
fn truncated_bytes_are_rejected_at_restore() {
    let bytes = EngineConfig::default().to_bytes();
    for len in 0..bytes.len() {
        let err = RefineDetectEngine::from_bytes(&bytes[..len]).unwrap_err();
        assert!(matches!(err, DetPostError::TruncatedBuffer { .. }), "len {len}");
    }
}
