mod support;

use appium_bridge::{AppiumConfig, AppiumError, AppiumHelper, SessionConfig, WindowSize};
use serde_json::json;
use soulbrowser_core_types::Platform;
use support::{android_app, FactoryMode, FakeDevice, FakeFactory};

fn parse(value: serde_json::Value) -> AppiumConfig {
    serde_json::from_value(value).expect("config deserializes")
}

#[test]
fn android_app_with_desired_capabilities() {
    let config = SessionConfig::normalize(parse(json!({
        "platform": "Android",
        "app": "/apps/demo.apk",
        "device": "emulator-5554",
        "port": 4724,
        "desiredCapabilities": {
            "appPackage": "com.example.demo",
            "deviceName": "Pixel 7",
            "platformVersion": "14"
        }
    })))
    .expect("valid config");

    assert_eq!(config.platform, Some(Platform::Android));
    assert!(!config.is_web);
    assert_eq!(config.address.port, 4724);
    assert_eq!(
        serde_json::Value::Object(config.capabilities.clone()),
        json!({
            "appium:appPackage": "com.example.demo",
            "appium:deviceName": "emulator-5554",
            "appium:platformVersion": "14",
            "appium:app": "/apps/demo.apk",
            "platformName": "Android"
        })
    );
    assert_eq!(
        config.desired_capabilities["platformVersion"],
        json!("14"),
        "conditional blocks match the capabilities as written"
    );
}

#[test]
fn mobile_safari_starts_in_web_mode() {
    let config = SessionConfig::normalize(parse(json!({
        "browser": "safari",
        "url": "https://shop.example.com",
        "platform": "iOS",
        "windowSize": "maximize",
        "waitForTimeout": 5000
    })))
    .expect("valid config");

    assert!(config.is_web);
    assert_eq!(config.platform, Some(Platform::Ios));
    assert_eq!(config.capabilities["browserName"], json!("safari"));
    assert_eq!(config.capabilities["platformName"], json!("iOS"));
    assert!(!config.capabilities.contains_key("appium:browserName"));
    assert_eq!(config.base_url.as_deref(), Some("https://shop.example.com"));
    assert_eq!(config.window_size, Some(WindowSize::Maximize));
    assert_eq!(config.wait_for_timeout_secs(), 5.0);
}

#[test]
fn app_wins_over_browser_for_mode() {
    let config = SessionConfig::normalize(parse(json!({
        "platform": "Android",
        "app": "/apps/hybrid.apk",
        "browser": "chrome"
    })))
    .expect("valid config");
    assert!(!config.is_web);
}

#[test]
fn vendor_prefixed_keys_are_accepted() {
    let config = SessionConfig::normalize(parse(json!({
        "platform": "Android",
        "appium:app": "/apps/demo.apk",
        "appium:device": "emulator-5556",
        "tunnelIdentifier": "tunnel-1"
    })))
    .expect("valid config");
    assert_eq!(config.capabilities["appium:app"], json!("/apps/demo.apk"));
    assert_eq!(config.capabilities["appium:deviceName"], json!("emulator-5556"));
    assert_eq!(config.capabilities["appium:tunnelIdentifier"], json!("tunnel-1"));
}

#[test]
fn invalid_window_size_is_a_configuration_error() {
    let err = SessionConfig::normalize(parse(json!({
        "browser": "chrome",
        "windowSize": "huge"
    })))
    .expect_err("bad window size");
    assert!(matches!(err, AppiumError::Configuration(_)));
}

#[test]
fn helper_refuses_config_without_target() {
    let result = AppiumHelper::new(
        parse(json!({ "device": "Pixel" })),
        FakeFactory::new(FakeDevice::with_contexts(&[])),
    );
    assert!(matches!(result, Err(AppiumError::Configuration(_))));
}

#[test]
fn session_request_carries_w3c_body() {
    let config = SessionConfig::normalize(android_app()).expect("valid config");
    let request = config.session_request();
    assert!(!request.is_multiremote());
    let body = request.new_session_body();
    assert_eq!(
        body["capabilities"]["alwaysMatch"]["platformName"],
        json!("Android")
    );
    assert_eq!(body["capabilities"]["firstMatch"], json!([{}]));
    assert_eq!(
        request.address.base_url(),
        "http://127.0.0.1:4723/wd/hub"
    );
}

#[tokio::test]
async fn refused_connection_names_server() {
    let factory = FakeFactory::with_mode(FakeDevice::with_contexts(&[]), FactoryMode::Refused);
    let mut helper = AppiumHelper::new(android_app(), factory).expect("valid config");

    let err = helper.start_session().await.expect_err("refused");
    assert_eq!(
        err.to_string(),
        "Can't connect to Appium server at http://127.0.0.1:4723/wd/hub, make sure it is running"
    );
    assert!(!err.is_retryable());
    assert!(!helper.is_running());
}

#[tokio::test]
async fn rejected_session_surfaces_client_error() {
    let factory = FakeFactory::with_mode(FakeDevice::with_contexts(&[]), FactoryMode::Rejected);
    let mut helper = AppiumHelper::new(android_app(), factory).expect("valid config");

    let err = helper.start_session().await.expect_err("rejected");
    assert!(matches!(err, AppiumError::Client(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn manual_start_skips_session_in_before() {
    let mut config = android_app();
    config.manual_start = Some(true);
    let device = FakeDevice::with_contexts(&["NATIVE_APP"]);
    let factory = FakeFactory::new(device);
    let mut helper = AppiumHelper::new(config, factory.clone()).expect("valid config");

    helper.before().await.expect("before");
    assert!(!helper.is_running());
    assert!(factory.requests.lock().unwrap().is_empty());

    let err = helper.close_app().await.expect_err("no session");
    assert!(matches!(err, AppiumError::SessionNotStarted));

    helper.start_session().await.expect("manual start");
    assert!(helper.is_running());
    assert_eq!(factory.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn before_starts_session_once() {
    let factory = FakeFactory::new(FakeDevice::with_contexts(&["NATIVE_APP"]));
    let mut helper = AppiumHelper::new(android_app(), factory.clone()).expect("valid config");

    helper.before().await.expect("before");
    helper.before().await.expect("before again");
    assert_eq!(factory.requests.lock().unwrap().len(), 1);
}
