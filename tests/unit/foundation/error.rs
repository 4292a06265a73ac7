use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ElephantError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ElephantError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        ElephantError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn render_error_names_the_layer() {
    let msg = ElephantError::render("layer4", "no such element").to_string();
    assert!(msg.contains("render error:"));
    assert!(msg.contains("layer4"));
    assert!(msg.contains("no such element"));
}

#[test]
fn encode_error_names_the_stage() {
    let msg = ElephantError::encode("ffmpeg encode", "exited with status 1").to_string();
    assert!(msg.starts_with("encode error: ffmpeg encode:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ElephantError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
