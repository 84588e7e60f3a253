#![allow(dead_code)]

use serde_json::{Value, json};

use life_kline::core::stem_branch::{BRANCHES, STEMS};

pub const BIRTH_YEAR: i32 = 1990;
pub const PILLARS: [&str; 4] = ["庚午", "辛巳", "壬申", "癸卯"];

/// Sexagenary label for cycle position `index`.
pub fn stem_branch(index: usize) -> String {
    format!("{}{}", STEMS[index % 10], BRANCHES[index % 12])
}

pub fn period_for(age: i32) -> String {
    if age < 4 {
        "童限".to_owned()
    } else {
        stem_branch(((age - 4) / 10) as usize + 17)
    }
}

/// Deterministic `(open, close, high, low)` for an age, all inside `5..=95`.
pub fn prices_for(age: i32) -> (f64, f64, f64, f64) {
    let open = f64::from(30 + (age * 37) % 40);
    let close = f64::from(30 + (age * 53 + 11) % 40);
    (open, close, open.max(close) + 5.0, open.min(close) - 5.0)
}

fn narrative_for(age: i32) -> String {
    format!("{}年流年平稳，宜稳中求进，谨慎理财。", BIRTH_YEAR + age - 1)
}

/// Nested `timeline[]` payload with `kLine` / `metaphysics` / `forecast`.
pub fn timeline_payload(points: i32) -> Value {
    let timeline: Vec<Value> = (1..=points)
        .map(|age| {
            let (open, close, high, low) = prices_for(age);
            json!({
                "age": age,
                "year": BIRTH_YEAR + age - 1,
                "kLine": {"open": open, "close": close, "high": high, "low": low},
                "metaphysics": {"ganZhi": stem_branch(age as usize + 5), "daYun": period_for(age)},
                "forecast": {"title": "流年", "content": narrative_for(age)}
            })
        })
        .collect();
    json!({
        "userName": "测试用户",
        "baseChart": {"pillars": {
            "year": {"ganZhi": PILLARS[0]},
            "month": {"ganZhi": PILLARS[1]},
            "day": {"ganZhi": format!("{} (日主)", PILLARS[2])},
            "hour": {"ganZhi": PILLARS[3]}
        }},
        "globalDimensions": {
            "summary": "先抑后扬，中年渐入佳境。",
            "scores": {"total": 72, "career": 8, "wealth": 65, "marriage": 7, "health": 9, "children": 6}
        },
        "timeline": timeline
    })
}

fn flat_points(points: i32) -> Vec<Value> {
    (1..=points)
        .map(|age| {
            let (open, close, high, low) = prices_for(age);
            json!({
                "age": age,
                "year": BIRTH_YEAR + age - 1,
                "ganZhi": stem_branch(age as usize + 5),
                "daYun": period_for(age),
                "open": open, "close": close, "high": high, "low": low,
                "reason": narrative_for(age)
            })
        })
        .collect()
}

/// `profile` + `summary` payload with points under `chartPoints`.
pub fn profile_payload(points: i32) -> Value {
    json!({
        "profile": {"name": "测试用户", "birthYear": BIRTH_YEAR, "bazi": PILLARS},
        "summary": {"dimensions": {
            "overall": {"content": "整体平稳", "score": 7},
            "career": {"content": "宜技术", "score": 80},
            "wealth": 6,
            "relationship": {"text": "晚婚为宜", "score": 6},
            "health": 8,
            "kinship": 7
        }},
        "chartPoints": flat_points(points)
    })
}

/// Legacy flat payload with `chartData` and `*Score` fields.
pub fn flat_payload(points: i32) -> Value {
    json!({
        "bazi": PILLARS,
        "summary": "总评平稳", "summaryScore": 7,
        "industry": "宜技术", "industryScore": 85,
        "wealth": "守财有道", "wealthScore": 6,
        "marriage": "晚婚", "marriageScore": 5,
        "health": "注意脾胃", "healthScore": 8,
        "family": "六亲和睦", "familyScore": 9,
        "chartData": flat_points(points)
    })
}
