use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use battcurve_protocol::{ClientCfg, ProtocolClient, ProtocolError};
use battcurve_traits::ChargeControl;
use rstest::rstest;

/// Serve one canned reply per connection, recording each request line.
/// When `hold_open` is set the server keeps the socket open after replying.
fn fake_daemon(
    replies: Vec<&'static str>,
    hold_open: Option<Duration>,
) -> (u16, Arc<Mutex<Vec<String>>>, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_bg = seen.clone();
    let handle = thread::spawn(move || {
        for reply in replies {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut req = String::new();
            stream.read_to_string(&mut req).expect("read request");
            seen_bg.lock().unwrap().push(req);
            stream.write_all(reply.as_bytes()).expect("write reply");
            if let Some(d) = hold_open {
                thread::sleep(d);
            }
        }
    });
    (port, seen, handle)
}

fn client(port: u16, timeout_ms: u64) -> ProtocolClient {
    ProtocolClient::new(ClientCfg {
        port,
        read_timeout: Duration::from_millis(timeout_ms),
        ..ClientCfg::default()
    })
}

#[rstest]
#[case("battery_v: 3.87\n")]
#[case("single\nbattery_v: 3.87\n")]
#[case("battery_v: 3.87\ndouble\nlong\n")]
#[case("\n\nsingle\r\nbattery_v:3.87\r\n\r\n")]
fn voltage_survives_event_noise(#[case] reply: &'static str) {
    let (port, seen, handle) = fake_daemon(vec![reply], None);
    let v = client(port, 1000).get_battery_voltage().expect("voltage");
    handle.join().unwrap();
    assert_eq!(v, 3.87);
    assert_eq!(seen.lock().unwrap().as_slice(), ["get battery_v\n"]);
}

#[test]
fn set_charging_sends_bool_and_checks_ack() {
    let (port, seen, handle) = fake_daemon(
        vec!["set_allow_charging: done\n", "set_allow_charging: DONE\n"],
        None,
    );
    let mut c = client(port, 1000);
    c.set_charging(false).expect("disable");
    c.set_charging(true).expect("enable");
    handle.join().unwrap();
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["set_allow_charging false\n", "set_allow_charging true\n"]
    );
}

#[test]
fn missing_ack_is_rejected() {
    let (port, _seen, handle) = fake_daemon(vec!["set_allow_charging: Invalid request\n"], None);
    let err = client(port, 1000).set_allow_charging(false).unwrap_err();
    handle.join().unwrap();
    match err {
        ProtocolError::ChargingRejected { enabled, line } => {
            assert!(!enabled);
            assert!(line.contains("Invalid"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn events_only_reply_is_no_response() {
    let (port, _seen, handle) = fake_daemon(vec!["single\ndouble\n"], None);
    let err = client(port, 1000).get_battery_voltage().unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, ProtocolError::NoResponse));
}

#[test]
fn read_timeout_ends_response_instead_of_failing() {
    let (port, _seen, handle) = fake_daemon(vec!["battery_v: 4.01\n"], Some(Duration::from_millis(600)));
    let start = Instant::now();
    let v = client(port, 150).get_battery_voltage().expect("voltage before timeout");
    assert!(start.elapsed() < Duration::from_millis(550));
    assert_eq!(v, 4.01);
    handle.join().unwrap();
}

#[test]
fn unreachable_daemon_is_connection_error() {
    // Grab a free port, then release it so nothing is listening.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let err = client(port, 200).get_battery_voltage().unwrap_err();
    assert!(err.is_connection(), "expected connection error, got {err:?}");
}

#[test]
fn trait_errors_downcast_to_protocol_error() {
    let (port, _seen, handle) = fake_daemon(vec!["battery_v: nope\n"], None);
    let mut c = client(port, 1000);
    let err = c.battery_voltage().unwrap_err();
    handle.join().unwrap();
    assert!(matches!(
        err.downcast_ref::<ProtocolError>(),
        Some(ProtocolError::InvalidVoltage(_))
    ));
}
