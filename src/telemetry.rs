use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 구조화된 로깅을 초기화합니다.
/// JSON 형식의 로그를 stderr로 출력하며, RUST_LOG 환경 변수로 로그 레벨을 제어합니다.
/// RUST_LOG가 없으면 `default_directive`를 사용합니다.
pub fn init_telemetry(default_directive: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // stdout은 명령 결과 출력용으로 남겨둡니다.
    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .init();
}
