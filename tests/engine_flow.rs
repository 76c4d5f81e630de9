//! Integration tests driving full line sequences through the engine.

use std::sync::{Arc, Mutex};

use ircflow::{CaseMapping, ChannelMode, Engine, EngineConfig, Event, EventKind};

struct Harness {
    engine: Engine,
    out: Vec<String>,
    seen: Arc<Mutex<Vec<EventKind>>>,
}

impl Harness {
    fn new(nickname: &str) -> Self {
        let engine = Engine::new(EngineConfig {
            nickname: nickname.to_owned(),
            ..EngineConfig::default()
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.add_listener(Arc::new(move |event: &Event| {
            sink.lock().unwrap().push(event.kind.clone());
        }));
        Self {
            engine,
            out: Vec::new(),
            seen,
        }
    }

    fn feed(&mut self, lines: &[&str]) {
        for line in lines {
            self.engine.dispatch(line, &mut self.out);
        }
    }

    fn events(&self) -> Vec<EventKind> {
        std::mem::take(&mut self.seen.lock().unwrap())
    }
}

#[test]
fn test_rename_fans_out_per_channel_before_client_event() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #alpha",
        ":me!u@host JOIN #beta",
        ":Old!o@host JOIN #alpha",
        ":Old!o@host JOIN #beta",
    ]);
    h.events();

    h.feed(&[":Old!o@host NICK :New"]);

    assert_eq!(
        h.events(),
        vec![
            EventKind::ChannelNickChanged {
                channel: "#alpha".to_owned(),
                nick: "New".to_owned(),
                old_nick: "Old".to_owned(),
            },
            EventKind::ChannelNickChanged {
                channel: "#beta".to_owned(),
                nick: "New".to_owned(),
                old_nick: "Old".to_owned(),
            },
            EventKind::NickChanged {
                nick: "New".to_owned(),
                old_nick: "Old".to_owned(),
            },
        ]
    );

    let state = h.engine.state();
    assert!(state.find_client("old").is_none());
    assert_eq!(state.find_client("NEW").unwrap().nickname(), "New");
    assert!(state.find_channel_client("#alpha", "new").is_some());
    assert!(state.find_channel_client("#beta", "new").is_some());
}

#[test]
fn test_rename_collision_leaves_state_untouched() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #a",
        ":alice!a@host JOIN #a",
        ":bob!b@host JOIN #a",
    ]);
    h.events();

    // "ALICE" folds onto the existing alice; the rename must not happen.
    h.feed(&[":bob!b@host NICK :ALICE"]);

    let events = h.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_fatal());

    let state = h.engine.state();
    assert_eq!(state.find_client("bob").unwrap().nickname(), "bob");
    assert_eq!(state.find_client("alice").unwrap().nickname(), "alice");
    assert!(state.find_channel_client("#a", "bob").is_some());
}

#[test]
fn test_message_classification_is_exclusive() {
    let mut h = Harness::new("me");
    h.feed(&[":srv 001 me :Welcome", ":me!u@host JOIN #a"]);
    h.events();

    h.feed(&[
        ":alice!a@h PRIVMSG #a :plain text",
        ":alice!a@h PRIVMSG #a :\u{1}ACTION waves\u{1}",
        ":alice!a@h PRIVMSG #a :\u{1}VERSION\u{1}",
        ":alice!a@h NOTICE #a :\u{1}PING 99\u{1}",
    ]);

    let events = h.events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], EventKind::ChannelMessage { .. }));
    assert!(matches!(events[1], EventKind::ChannelAction { .. }));
    assert!(matches!(events[2], EventKind::ChannelCtcp { .. }));
    assert!(matches!(events[3], EventKind::ChannelCtcpReply { .. }));
}

#[test]
fn test_cap_negotiation_requests_once_then_goes_quiet() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv CAP * LS * :multi-prefix sasl",
        ":srv CAP * LS :userhost-in-names tsirc",
    ]);

    assert_eq!(
        h.out,
        vec![
            "CAP REQ :multi-prefix",
            "CAP REQ :userhost-in-names",
            "CAP REQ :tsirc",
            "CAP END",
        ]
    );

    h.out.clear();
    h.feed(&[":srv CAP * LS :multi-prefix sasl"]);
    assert!(h.out.is_empty());
}

#[test]
fn test_casemapping_switch_rekeys_live_state() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #chan[1]",
        ":Pal[a]!p@host JOIN #chan[1]",
    ]);

    // Under rfc1459 the brace forms alias the bracket forms.
    assert!(h.engine.state().find_client("pal{a}").is_some());
    assert!(h.engine.state().find_channel("#chan{1}").is_some());

    h.feed(&[":srv 005 me CASEMAPPING=ascii :are supported by this server"]);

    assert_eq!(h.engine.state().casemapping(), CaseMapping::Ascii);
    assert!(h.engine.state().find_client("pal{a}").is_none());
    assert!(h.engine.state().find_client("PAL[A]").is_some());
    assert!(h.engine.state().find_channel_client("#CHAN[1]", "pal[a]").is_some());
}

#[test]
fn test_names_reply_with_multi_prefix_and_userhost() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #a",
        ":srv 353 me = #a :me @+ada!a@node bob",
        ":srv 366 me #a :End of /NAMES list",
    ]);

    let state = h.engine.state();
    let ada = state.find_channel_client("#a", "ada").unwrap();
    assert!(ada.has_mode(ChannelMode::Oper));
    assert!(ada.has_mode(ChannelMode::Voice));
    assert_eq!(state.find_client("ada").unwrap().hostname(), "node");
    assert!(state.find_channel_client("#a", "bob").is_some());
}

#[test]
fn test_kick_and_quit_prune_state() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #a",
        ":ada!a@h JOIN #a",
        ":bob!b@h JOIN #a",
    ]);
    h.events();

    h.feed(&[":ada!a@h KICK #a bob :enough", ":ada!a@h QUIT :gone"]);

    let events = h.events();
    assert_eq!(
        events,
        vec![
            EventKind::ChannelKick {
                channel: "#a".to_owned(),
                nick: "bob".to_owned(),
                kicked_by: "ada!a@h".to_owned(),
                reason: "enough".to_owned(),
            },
            EventKind::ChannelQuit {
                channel: "#a".to_owned(),
                nick: "ada".to_owned(),
                reason: "gone".to_owned(),
            },
            EventKind::Quit {
                nick: "ada".to_owned(),
                hostmask: "ada!a@h".to_owned(),
                reason: "gone".to_owned(),
            },
        ]
    );

    let state = h.engine.state();
    assert!(state.find_client("bob").is_none());
    assert!(state.find_client("ada").is_none());
    assert!(state.find_client("me").is_some());
}

#[test]
fn test_independent_engines_converge_on_same_lines() {
    let session = [
        ":srv CAP * LS :multi-prefix",
        ":srv 001 me :Welcome",
        ":me!u@host JOIN #room",
        ":srv 353 me = #room :me @ada +bob",
        ":srv MODE #room +tn",
        ":ada!a@h MODE #room +o bob",
        ":bob!b@h NICK :rob",
        ":ada!a@h PART #room :afk",
    ];

    let mut first = Harness::new("me");
    let mut second = Harness::new("me");
    first.feed(&session);
    second.feed(&session);

    assert_eq!(first.events(), second.events());
    assert_eq!(first.out, second.out);

    for h in [&first, &second] {
        let state = h.engine.state();
        let room = state.find_channel("#room").unwrap();
        assert!(room.has_mode(ChannelMode::ProtectedTopic));
        assert!(state.find_channel_client("#room", "ROB").unwrap().has_mode(ChannelMode::Oper));
        assert!(state.find_client("ada").is_none());
    }
}

#[test]
fn test_unknown_commands_do_not_disturb_the_stream() {
    let mut h = Harness::new("me");
    h.feed(&[
        ":srv 001 me :Welcome",
        ":srv 999 me :mystery numeric",
        "WALLOPS :unhandled command",
        ":me!u@host JOIN #a",
    ]);
    assert!(h.engine.state().find_channel("#a").is_some());
}
