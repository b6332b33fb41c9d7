//! Example scoring payload for a single match, used by the probe command and tests

use crate::types::ScoringRequest;
use serde_json::json;

/// Feature values for one home match, in training column order
pub fn example_payload() -> ScoringRequest {
    let value = json!({
        "Is_Home": 1,
        "Goals": 2,
        "Opponent_Goals": 1,
        "Possession": 55,
        "Shots": 12,
        "Shots_On_Target": 6,
        "Passes_Completed": 300,
        "Pass_Accuracy": 82.5,
        "Corners": 4,
        "Crosses": 10,
        "Fouls": 12,
        "Offsides": 2,
        "Opponent_Possession": 45,
        "Opponent_Shots": 8,
        "Opponent_Shots_On_Target": 3,
        "Opponent_Passes_Completed": 280,
        "Opponent_Pass_Accuracy": 78.0,
        "Opponent_Corners": 5,
        "Opponent_Crosses": 7,
        "Opponent_Fouls": 15,
        "Opponent_Offsides": 1,
        "Shot_Efficiency": 0.25,
        "Season": 2024,
        "Month": 8,
        "Day_of_Week": 6,
        "Last5_Avg_Goals": 1.8,
        "Last5_Win_Rate": 0.6
    });

    match value {
        serde_json::Value::Object(map) => ScoringRequest::from(map),
        _ => ScoringRequest::new(),
    }
}

/// Feature names of [`example_payload`], in order
pub fn example_feature_names() -> Vec<String> {
    example_payload().iter().map(|(name, _)| name.clone()).collect()
}
