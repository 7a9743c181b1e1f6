use anyhow::Result;
use auto_clicker::config::{parse_duration, Config};
use auto_clicker::{
    App, Call, ClickJob, ClickOptions, ClickScheduler, ClickType, FieldUpdate, FieldValue,
    InputDriver, InputEvent, MouseButton, Notification, ProfileStore, RepeatPolicy, Request,
    Response, SettingsFile, WindowChrome,
};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

#[derive(Default)]
struct RecordingDriver {
    events: Vec<InputEvent>,
}

impl InputDriver for RecordingDriver {
    fn send(&mut self, event: InputEvent) -> auto_clicker::Result<()> {
        self.events.push(event);
        Ok(())
    }
}

struct NoChrome;

impl WindowChrome for NoChrome {
    fn minimize(&mut self) {}
    fn close(&mut self) {}
    fn set_always_on_top(&mut self, _enabled: bool) {}
}

fn job(button: MouseButton, click_type: ClickType, repeat: RepeatPolicy) -> ClickJob {
    ClickJob {
        button,
        click_type,
        repeat,
        interval: Duration::from_millis(25),
    }
}

// Scheduler tests

#[tokio::test(start_paused = true)]
async fn test_bounded_job_clicks_n_times_then_reports_finished() {
    for n in [1, 2, 7] {
        let (mut scheduler, mut ticks) =
            ClickScheduler::new(RecordingDriver::default(), Duration::from_millis(1));

        let mut finished = 0;
        if scheduler
            .start(job(MouseButton::Middle, ClickType::Single, RepeatPolicy::Times(n)))
            .unwrap()
            .is_some()
        {
            finished += 1;
        }
        while scheduler.is_active() {
            let tick = ticks.recv().await.unwrap();
            if let Some(note) = scheduler.on_tick(tick) {
                assert_eq!(note, Notification::AutoclickStopped { success: true });
                finished += 1;
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(
            scheduler.driver().events,
            vec![InputEvent::Click(MouseButton::Middle); n as usize]
        );
        assert!(!scheduler.state().running);
    }
}

#[tokio::test(start_paused = true)]
async fn test_hold_is_pressed_once_and_released_once() {
    let (mut scheduler, mut ticks) =
        ClickScheduler::new(RecordingDriver::default(), Duration::from_millis(1));
    scheduler
        .start(job(MouseButton::Right, ClickType::Hold, RepeatPolicy::Loop))
        .unwrap();

    for _ in 0..10 {
        let tick = ticks.recv().await.unwrap();
        scheduler.on_tick(tick);
    }
    scheduler.stop();
    scheduler.stop();
    scheduler.stop();

    assert_eq!(
        scheduler.driver().events,
        vec![
            InputEvent::Press(MouseButton::Right),
            InputEvent::Release(MouseButton::Right),
        ]
    );
}

#[test]
fn test_stop_on_idle_scheduler_emits_nothing() {
    let (mut scheduler, _ticks) =
        ClickScheduler::new(RecordingDriver::default(), Duration::from_millis(1));
    scheduler.stop();
    assert!(scheduler.driver().events.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_runs_full_count() {
    let (mut scheduler, mut ticks) =
        ClickScheduler::new(RecordingDriver::default(), Duration::from_millis(1));
    let bounded = job(MouseButton::Left, ClickType::Single, RepeatPolicy::Times(3));

    scheduler.start(bounded).unwrap();
    let tick = ticks.recv().await.unwrap();
    scheduler.on_tick(tick);
    scheduler.stop();
    assert_eq!(scheduler.driver().events.len(), 2);

    scheduler.start(bounded).unwrap();
    while scheduler.is_active() {
        let tick = ticks.recv().await.unwrap();
        scheduler.on_tick(tick);
    }
    assert_eq!(scheduler.driver().events.len(), 5);
}

// Profile store tests

#[test]
fn test_profile_add_then_list() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ProfileStore::open(dir.path().join("database.db"))?;

    let fields = vec![
        FieldUpdate::new("mouseButtonInput", FieldValue::Text("middle".into())),
        FieldUpdate::new("delayCheckbox", FieldValue::Bool(true)),
        FieldUpdate::new("delayAmount", FieldValue::Text("750".into())),
        FieldUpdate::new("typeInput", FieldValue::Text("hold".into())),
        FieldUpdate::new("alwaysOnTopCheckbox", FieldValue::Bool(true)),
        FieldUpdate::new("hoursInput", FieldValue::Integer(1)),
    ];
    let first = store.insert("first", &fields)?;
    let second = store.insert("second", &[])?;
    assert_ne!(first, second);

    let profiles = store.list()?;
    assert_eq!(profiles.len(), 2);
    let p = profiles.iter().find(|p| p.id == first).unwrap();
    assert_eq!(p.title, "first");
    assert_eq!(p.options.mouse_button_input, MouseButton::Middle);
    assert!(p.options.delay_checkbox);
    assert_eq!(p.options.delay_amount, 750);
    assert_eq!(p.options.type_input, ClickType::Hold);
    assert!(p.options.always_on_top_checkbox);
    assert_eq!(p.options.interval(), Duration::from_secs(3600));

    Ok(())
}

#[test]
fn test_profile_delete() -> Result<()> {
    let store = ProfileStore::open_in_memory()?;
    let id = store.insert("temp", &[])?;

    assert!(!store.delete(id + 42)?);
    assert!(store.delete(id)?);
    assert!(store.list()?.iter().all(|p| p.id != id));

    Ok(())
}

// Settings document tests

#[test]
fn test_settings_mutual_exclusion() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = SettingsFile::open_or_create(dir.path().join("options.json"))?;

    settings.save_field("loopInput", &FieldValue::Bool(false));
    let options = settings.get().unwrap();
    assert!(!options.loop_input);
    assert!(options.repeat_set_times_input);

    settings.save_field("repeatSetTimesInput", &FieldValue::Bool(false));
    let options = settings.get().unwrap();
    assert!(options.loop_input);
    assert!(!options.repeat_set_times_input);

    Ok(())
}

#[test]
fn test_settings_file_written_by_older_version() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(
        br#"{
  "mouseButtonInput": "right",
  "delayCheckbox": false,
  "delayAmount": "1000",
  "typeInput": "double",
  "repeatSetTimesInput": true,
  "repeatTimes": "12",
  "alwaysOnTopCheckbox": true,
  "loopInput": false,
  "hoursInput": "0",
  "minutesInput": "0",
  "secondsInput": "1",
  "millisecondsInput": "500"
}"#,
    )?;

    let settings = SettingsFile::new(file.path());
    let options = settings.get().unwrap();
    let job = options.click_job();
    assert_eq!(job.button, MouseButton::Right);
    assert_eq!(job.click_type, ClickType::Double);
    assert_eq!(job.repeat, RepeatPolicy::Times(12));
    assert_eq!(job.interval, Duration::from_millis(1500));

    Ok(())
}

// Command surface tests

#[tokio::test(start_paused = true)]
async fn test_command_surface_end_to_end() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let settings = SettingsFile::open_or_create(dir.path().join("options.json"))?;
    let store = ProfileStore::open(dir.path().join("database.db"))?;
    let (note_tx, mut notes) = mpsc::unbounded_channel();
    let app = App::new(
        RecordingDriver::default(),
        NoChrome,
        store,
        settings,
        note_tx,
        &Config::default(),
    );
    let (calls, rx) = mpsc::channel(4);

    let ui = async move {
        let ask = |json: &str| {
            let envelope: auto_clicker::Envelope = serde_json::from_str(json).unwrap();
            Call::new(envelope.request)
        };

        let (call, reply) = ask(r#"{"cmd": "profile-add", "title": "burst", "optionValues": [{"input": "repeatTimes", "value": "2"}]}"#);
        calls.send(call).await.unwrap();
        assert_eq!(reply.await.unwrap().unwrap(), Response::None);

        let (call, reply) = ask(r#"{"cmd": "profile-list"}"#);
        calls.send(call).await.unwrap();
        let Response::Profiles(profiles) = reply.await.unwrap().unwrap() else {
            panic!("expected profiles");
        };
        assert_eq!(profiles[0].title, "burst");
        assert_eq!(profiles[0].options.repeat_times, 2);

        let (call, reply) = ask(
            r#"{"cmd": "scheduler-start", "input": "left", "type": "single", "repeat": "2", "interval": "5"}"#,
        );
        calls.send(call).await.unwrap();
        reply.await.unwrap().unwrap();
        assert_eq!(
            notes.recv().await.unwrap(),
            Notification::AutoclickStopped { success: true }
        );

        let (call, reply) = ask(r#"{"cmd": "settings-get"}"#);
        calls.send(call).await.unwrap();
        assert_eq!(
            reply.await.unwrap().unwrap(),
            Response::Settings(Some(ClickOptions::default()))
        );

        let (call, reply) = Call::new(Request::WindowClose);
        calls.send(call).await.unwrap();
        reply.await.unwrap().unwrap();
    };

    tokio::join!(app.run(rx), ui);
    Ok(())
}

// Config tests

#[test]
fn test_config_file_operations() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(
        br#"{
            "database_path": "clicks.db",
            "toggle_hotkey": "ctrl+alt+f9",
            "min_interval": "5ms",
            "standalone": true
        }"#,
    )?;

    let config = Config::from_file(temp_file.path().to_str().unwrap())?;
    assert_eq!(config.database_path.to_str(), Some("clicks.db"));
    assert_eq!(config.settings_path.to_str(), Some("options.json"));
    assert_eq!(config.toggle_hotkey, "ctrl+alt+f9");
    assert_eq!(config.min_interval, Duration::from_millis(5));
    assert!(config.standalone);
    assert!(config.validate().is_ok());

    Ok(())
}

#[test]
fn test_config_save_load_roundtrip() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("config.json");

    let original = Config {
        toggle_hotkey: "shift+f6".to_string(),
        min_interval: Duration::from_millis(20),
        verbose: true,
        ..Config::default()
    };
    original.save_to_file(config_path.to_str().unwrap())?;

    let loaded = Config::from_file(config_path.to_str().unwrap())?;
    assert_eq!(loaded, original);

    Ok(())
}

#[test]
fn test_config_load_errors() {
    assert!(Config::from_file("/nonexistent/autoclick.json").is_err());
    assert!(parse_duration("fast").is_err());
}

// Error type tests

#[test]
fn test_error_types() {
    use auto_clicker::ClickerError;

    let err = ClickerError::unknown_field("bogusInput");
    assert!(err.to_string().contains("bogusInput"));

    let err = ClickerError::invalid_hotkey("ctrl+?", "unsupported key");
    assert!(err.to_string().contains("ctrl+?"));

    let err = ClickerError::AlreadyRunning;
    assert!(err.to_string().contains("already active"));
}
