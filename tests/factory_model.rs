use claimcast::config::{GbdtParams, LogisticParams, ModelType};
use claimcast::models::factory;
use ndarray::Array2;

fn toy_dataset() -> (Array2<f32>, Vec<i32>) {
    // Two well separated clusters.
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, 0.9, 0.1, 1.1, 0.0, 1.0, 0.2, 0.0, 1.0, 0.1, 0.9, 0.0, 1.1, 0.2, 1.0,
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![1, 1, 1, 1, 0, 0, 0, 0];
    (x, y)
}

#[test]
fn factory_builds_and_predicts_gbdt() {
    let (x, y) = toy_dataset();
    let params = GbdtParams {
        num_boost_round: 5,
        max_depth: 3,
        ..GbdtParams::default()
    };
    let mut model = factory::build_model(&ModelType::Gbdt(params));
    assert_eq!(model.name(), "gbdt");

    model.fit(&x, &y).expect("fit failed");
    let probabilities = model.predict_proba(&x).expect("predict failed");
    assert_eq!(probabilities.len(), x.nrows());
    assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn factory_builds_and_predicts_logistic() {
    let (x, y) = toy_dataset();
    let mut model = factory::build_model(&ModelType::Logistic(LogisticParams::default()));
    assert_eq!(model.name(), "logistic");

    model.fit(&x, &y).expect("fit failed");
    let probabilities = model.predict_proba(&x).expect("predict failed");
    assert_eq!(probabilities.len(), x.nrows());
    assert!(
        probabilities[0] > probabilities[4],
        "claim cluster should score higher ({} vs {})",
        probabilities[0],
        probabilities[4]
    );
}
