// Run this benchmark with:
// cargo bench --bench emission_walk

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use vmaf_feature_collector::{Collector, MetadataEvent, MetadataSubscriberConfig, PredictionModel, Result};

struct SumModel {
    name: String,
    features: Vec<String>,
}

impl PredictionModel for SumModel {
    fn name(&self) -> &str {
        &self.name
    }
    fn features(&self) -> &[String] {
        &self.features
    }
    fn predict(&self, collector: &Collector, picture_index: u32) -> Result<f64> {
        let mut total = 0.0;
        for feature in &self.features {
            total += collector.get_score(feature, picture_index)?;
        }
        collector.append(&self.name, picture_index, total)?;
        Ok(total)
    }
}

fn prediction_cursor_walk(c: &mut Criterion) {
    c.bench_function("emission_walk_1000_frames", |b| {
        b.iter_batched(
            || {
                let collector = Collector::new();
                collector
                    .mount_model(std::sync::Arc::new(SumModel {
                        name: "vmaf".to_string(),
                        features: vec!["vif".to_string(), "motion".to_string()],
                    }))
                    .unwrap();
                collector
                    .register_metadata_subscriber(MetadataSubscriberConfig {
                        feature_name_filter: None,
                        callback: std::sync::Arc::new(|_event: &MetadataEvent| {}),
                    })
                    .unwrap();
                collector
            },
            |collector| {
                for i in 0..1000u32 {
                    collector.append("vif", i, i as f64).unwrap();
                    collector.append("motion", i, (i * 2) as f64).unwrap();
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, prediction_cursor_walk);
criterion_main!(benches);
