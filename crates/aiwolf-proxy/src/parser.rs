//! Game-log projection of the server snapshots
//!
//! The diffed adapter mode feeds every snapshot through a [`GameInfoParser`]
//! and forwards only the rows it appended since the previous call.

use aiwolf_core::{
    AgentIdx, AgentRef, GameInfo, GameSetting, Judge, LogKind, LogRow, Request, Result, Talk,
    Vote, WolfError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Turns snapshots into an incremental tabular diff
pub trait GameInfoParser: Send {
    /// Start of a game
    fn initialize(&mut self, game_info: &GameInfo, setting: &GameSetting) -> Result<()>;

    /// Snapshot for `request`, with the already-normalized histories
    fn update(
        &mut self,
        game_info: &GameInfo,
        talk_history: &[Value],
        whisper_history: &[Value],
        request: &Request,
    ) -> Result<()>;

    /// Rows added since the last call
    fn take_diff(&mut self) -> Vec<LogRow>;
}

/// Default parser keeping the whole game log in memory
#[derive(Debug, Default)]
pub struct TableParser {
    rows: Vec<LogRow>,
    returned: usize,
    me: AgentIdx,
    player_num: Option<u64>,
}

impl TableParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row of the current game
    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    /// `playerNum` from the game settings
    pub fn player_num(&self) -> Option<u64> {
        self.player_num
    }

    fn push_roles(&mut self, game_info: &GameInfo, day: i64, kind: LogKind) -> Result<()> {
        for (agent, role) in role_map(game_info)? {
            self.rows.push(LogRow::new(
                day,
                kind,
                agent as i64,
                0,
                agent,
                format!("COMINGOUT {} {}", AgentRef(agent), role),
            ));
        }
        Ok(())
    }

    fn push_talks(&mut self, entries: &[Value], kind: LogKind) -> Result<()> {
        for entry in entries {
            let talk: Talk = decode_entry(entry, "talk")?;
            self.rows
                .push(LogRow::new(talk.day, kind, talk.idx, talk.turn, talk.agent, talk.text));
        }
        Ok(())
    }

    fn push_votes(&mut self, game_info: &GameInfo, key: &str, kind: LogKind) -> Result<()> {
        let verb = match kind {
            LogKind::AttackVote => "ATTACK",
            _ => "VOTE",
        };
        for vote in list::<Vote>(game_info, key)? {
            self.rows.push(LogRow::new(
                vote.day,
                kind,
                vote.target as i64,
                0,
                vote.agent,
                format!("{} {}", verb, AgentRef(vote.target)),
            ));
        }
        Ok(())
    }

    fn push_judge(&mut self, game_info: &GameInfo, key: &str, kind: LogKind) -> Result<()> {
        let Some(value) = game_info.get(key).filter(|v| !v.is_null()) else {
            return Ok(());
        };
        let judge: Judge = decode_entry(value, key)?;
        let verb = match kind {
            LogKind::Identify => "IDENTIFIED",
            _ => "DIVINED",
        };
        self.rows.push(LogRow::new(
            judge.day,
            kind,
            judge.target as i64,
            0,
            judge.agent,
            format!("{} {} {}", verb, AgentRef(judge.target), judge.result),
        ));
        Ok(())
    }

    fn push_night(&mut self, game_info: &GameInfo, day: i64) -> Result<()> {
        if let Some(target) = agent_field(game_info, "guardedAgent") {
            self.rows.push(LogRow::new(
                day,
                LogKind::Guard,
                target as i64,
                0,
                self.me,
                format!("GUARDED {}", AgentRef(target)),
            ));
        }
        if let Some(target) = agent_field(game_info, "executedAgent") {
            self.rows
                .push(LogRow::new(day, LogKind::Execute, target as i64, 0, target, "Over"));
        }
        if let Some(target) = agent_field(game_info, "attackedAgent") {
            self.rows.push(LogRow::new(
                day,
                LogKind::Attack,
                target as i64,
                0,
                self.me,
                format!("ATTACK {}", AgentRef(target)),
            ));
        }
        for target in list::<AgentIdx>(game_info, "lastDeadAgentList")? {
            self.rows
                .push(LogRow::new(day, LogKind::Dead, target as i64, 0, target, "Over"));
        }
        Ok(())
    }
}

impl GameInfoParser for TableParser {
    fn initialize(&mut self, game_info: &GameInfo, setting: &GameSetting) -> Result<()> {
        self.rows.clear();
        self.returned = 0;
        self.me = agent_field(game_info, "agent").unwrap_or_default();
        self.player_num = setting.get("playerNum").and_then(|v| v.as_u64());
        self.push_roles(game_info, 0, LogKind::Initialize)
    }

    fn update(
        &mut self,
        game_info: &GameInfo,
        talk_history: &[Value],
        whisper_history: &[Value],
        request: &Request,
    ) -> Result<()> {
        self.push_talks(talk_history, LogKind::Talk)?;
        self.push_talks(whisper_history, LogKind::Whisper)?;

        let day = game_info.get("day").and_then(|v| v.as_i64()).unwrap_or_default();
        match request {
            Request::DailyInitialize => {
                self.push_judge(game_info, "divineResult", LogKind::Divine)?;
                self.push_judge(game_info, "mediumResult", LogKind::Identify)?;
                self.push_night(game_info, day)?;
                self.push_votes(game_info, "voteList", LogKind::Vote)?;
                self.push_votes(game_info, "attackVoteList", LogKind::AttackVote)?;
            }
            Request::Vote => self.push_votes(game_info, "latestVoteList", LogKind::Vote)?,
            Request::Attack => {
                self.push_votes(game_info, "latestAttackVoteList", LogKind::AttackVote)?
            }
            Request::Finish => self.push_roles(game_info, day, LogKind::Finish)?,
            _ => {}
        }
        Ok(())
    }

    fn take_diff(&mut self) -> Vec<LogRow> {
        let diff = self.rows[self.returned..].to_vec();
        self.returned = self.rows.len();
        diff
    }
}

fn decode_entry<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    serde_json::from_value(value.clone())
        .map_err(|e| WolfError::Protocol(format!("Invalid {} entry: {}", what, e)))
}

/// Array under `key`; missing or null counts as empty
fn list<T: DeserializeOwned>(game_info: &GameInfo, key: &str) -> Result<Vec<T>> {
    match game_info.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => decode_entry(value, key),
    }
}

/// Agent index under `key`; `-1` means nobody
fn agent_field(game_info: &GameInfo, key: &str) -> Option<AgentIdx> {
    game_info
        .get(key)
        .and_then(|v| v.as_i64())
        .and_then(|v| AgentIdx::try_from(v).ok())
        .filter(|&idx| idx >= 0)
}

/// roleMap entries ordered by agent index
fn role_map(game_info: &GameInfo) -> Result<Vec<(AgentIdx, String)>> {
    let map: BTreeMap<String, String> = list_or_default(game_info, "roleMap")?;
    let mut roles = map
        .into_iter()
        .map(|(k, role)| {
            k.parse::<AgentIdx>()
                .map(|idx| (idx, role))
                .map_err(|_| WolfError::Protocol(format!("Invalid roleMap key: {}", k)))
        })
        .collect::<Result<Vec<_>>>()?;
    roles.sort_by_key(|(idx, _)| *idx);
    Ok(roles)
}

fn list_or_default<T: DeserializeOwned + Default>(game_info: &GameInfo, key: &str) -> Result<T> {
    match game_info.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => decode_entry(value, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> GameInfo {
        value.as_object().cloned().unwrap()
    }

    fn initialized() -> TableParser {
        let mut parser = TableParser::new();
        parser
            .initialize(
                &object(json!({"agent": 1, "roleMap": {"1": "SEER"}})),
                &object(json!({"playerNum": 5})),
            )
            .unwrap();
        parser
    }

    #[test]
    fn test_initialize_rows() {
        let mut parser = initialized();
        assert_eq!(parser.player_num(), Some(5));

        let diff = parser.take_diff();
        assert_eq!(
            diff,
            vec![LogRow::new(0, LogKind::Initialize, 1, 0, 1, "COMINGOUT Agent[01] SEER")]
        );
        assert!(parser.take_diff().is_empty());
    }

    #[test]
    fn test_talks_only_appear_once() {
        let mut parser = initialized();
        parser.take_diff();

        let talk = vec![json!({"idx": 0, "day": 1, "turn": 0, "agent": 2, "text": "Over"})];
        parser
            .update(&GameInfo::new(), &talk, &[], &Request::Talk)
            .unwrap();
        let diff = parser.take_diff();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].kind, LogKind::Talk);
        assert_eq!(diff[0].agent, 2);

        parser
            .update(&GameInfo::new(), &[], &[], &Request::Talk)
            .unwrap();
        assert!(parser.take_diff().is_empty());
        assert_eq!(parser.rows().len(), 2);
    }

    #[test]
    fn test_daily_initialize_rows() {
        let mut parser = initialized();
        parser.take_diff();

        let game_info = object(json!({
            "day": 2,
            "divineResult": {"day": 1, "agent": 1, "target": 4, "result": "WEREWOLF"},
            "mediumResult": null,
            "guardedAgent": -1,
            "executedAgent": 3,
            "lastDeadAgentList": [5],
            "voteList": [
                {"day": 1, "agent": 1, "target": 3},
                {"day": 1, "agent": 2, "target": 3}
            ],
            "attackVoteList": []
        }));
        parser
            .update(&game_info, &[], &[], &Request::DailyInitialize)
            .unwrap();

        let kinds: Vec<LogKind> = parser.take_diff().into_iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LogKind::Divine,
                LogKind::Execute,
                LogKind::Dead,
                LogKind::Vote,
                LogKind::Vote
            ]
        );
        assert_eq!(parser.rows()[1].text, "DIVINED Agent[04] WEREWOLF");
        assert_eq!(parser.rows()[4].text, "VOTE Agent[03]");
    }

    #[test]
    fn test_night_rows() {
        let mut parser = initialized();
        parser.take_diff();

        let game_info = object(json!({
            "day": 3,
            "mediumResult": {"day": 2, "agent": 1, "target": 6, "result": "HUMAN"},
            "guardedAgent": 2,
            "attackedAgent": 4,
            "attackVoteList": [{"day": 2, "agent": 5, "target": 4}]
        }));
        let whispers = vec![json!({"idx": 0, "day": 3, "turn": 0, "agent": 5, "text": "Skip"})];
        parser
            .update(&game_info, &[], &whispers, &Request::DailyInitialize)
            .unwrap();

        let diff = parser.take_diff();
        let rows: Vec<(LogKind, i64, &str)> = diff
            .iter()
            .map(|r| (r.kind, r.day, r.text.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (LogKind::Whisper, 3, "Skip"),
                (LogKind::Identify, 2, "IDENTIFIED Agent[06] HUMAN"),
                (LogKind::Guard, 3, "GUARDED Agent[02]"),
                (LogKind::Attack, 3, "ATTACK Agent[04]"),
                (LogKind::AttackVote, 2, "ATTACK Agent[04]"),
            ]
        );
        assert_eq!(diff[0].agent, 5);
        assert_eq!(diff[2].agent, 1);
        assert_eq!(diff[4].agent, 5);
    }

    #[test]
    fn test_attack_request_reads_latest_attack_votes() {
        let mut parser = initialized();
        parser.take_diff();

        let game_info = object(json!({
            "day": 2,
            "latestAttackVoteList": [
                {"day": 2, "agent": 1, "target": 3},
                {"day": 2, "agent": 5, "target": 4}
            ],
            "latestVoteList": [{"day": 2, "agent": 4, "target": 1}]
        }));
        parser.update(&game_info, &[], &[], &Request::Attack).unwrap();

        let diff = parser.take_diff();
        assert_eq!(diff.len(), 2);
        assert!(diff.iter().all(|r| r.kind == LogKind::AttackVote));
        assert_eq!(diff[0].text, "ATTACK Agent[03]");
        assert_eq!(diff[1].idx, 4);
    }

    #[test]
    fn test_revote_and_finish() {
        let mut parser = initialized();
        parser.take_diff();

        let game_info = object(json!({
            "day": 1,
            "latestVoteList": [{"day": 1, "agent": 4, "target": 2}],
            "roleMap": {"10": "WEREWOLF", "2": "VILLAGER"}
        }));
        parser.update(&game_info, &[], &[], &Request::Vote).unwrap();
        parser.update(&game_info, &[], &[], &Request::Finish).unwrap();

        let diff = parser.take_diff();
        assert_eq!(diff.len(), 3);
        assert_eq!(diff[0].kind, LogKind::Vote);
        // roleMap keys are ordered numerically, not lexically
        assert_eq!(diff[1].agent, 2);
        assert_eq!(diff[2].text, "COMINGOUT Agent[10] WEREWOLF");
    }

    #[test]
    fn test_malformed_talk_is_protocol_error() {
        let mut parser = initialized();
        let err = parser
            .update(&GameInfo::new(), &[json!({"idx": 0})], &[], &Request::Talk)
            .unwrap_err();
        assert!(matches!(err, WolfError::Protocol(_)));
    }
}
