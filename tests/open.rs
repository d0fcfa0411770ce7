use std::io;

use evstream::{Device, Evdev};

#[test]
fn missing_node() {
    let err = Device::open("/dev/input/event-does-not-exist").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert!(
        err.to_string().contains("/dev/input/event-does-not-exist"),
        "{err}"
    );
}

#[test]
fn not_an_evdev_node() {
    // `/dev/null` opens fine but rejects evdev ioctls.
    let err = Evdev::open("/dev/null").unwrap_err();
    assert!(err.to_string().contains("EVIOCGVERSION"), "{err}");
    assert!(Device::open("/dev/null").is_err());
}
