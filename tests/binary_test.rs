use std::net::{Ipv4Addr, TcpStream};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const BIN: &str = env!("CARGO_BIN_EXE_multiport-mock");

fn free_port() -> u16 {
    std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn wait_for_port(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while TcpStream::connect((Ipv4Addr::LOCALHOST, port)).is_err() {
        assert!(Instant::now() < deadline, "server did not start on {}", port);
        std::thread::sleep(Duration::from_millis(50));
    }
}

#[test]
fn test_missing_port_configuration_exits_before_binding() {
    let output = Command::new(BIN)
        .env_clear()
        .env("STARTUP_DELAY", "2")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SERVER_PORT_1"), "stderr: {}", stderr);
}

#[test]
fn test_malformed_status_code_exits() {
    let output = Command::new(BIN)
        .env_clear()
        .env("SERVER_PORT_1", free_port().to_string())
        .env("STATUS_CODE_1", "ok")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("STATUS_CODE_1"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_file_exits() {
    let output = Command::new(BIN)
        .env_clear()
        .args(["--config", "/nonexistent/ports.toml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_sigterm_drains_in_flight_request() {
    let port = free_port();
    let mut child = Command::new(BIN)
        .env_clear()
        .env("SERVER_PORT_1", port.to_string())
        .env("SERVER_RESPONSE_1", "draining")
        .env("RESPONSE_DELAY_1", "1.5")
        .args(["--bind", "127.0.0.1", "--drain-timeout", "5"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    tokio::task::spawn_blocking(move || wait_for_port(port))
        .await
        .unwrap();

    let in_flight = tokio::spawn(reqwest::get(format!("http://127.0.0.1:{}/work", port)));
    tokio::time::sleep(Duration::from_millis(400)).await;

    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "draining");

    let status = tokio::task::spawn_blocking(move || child.wait())
        .await
        .unwrap()
        .unwrap();
    assert!(status.success(), "exit status: {:?}", status);
}
