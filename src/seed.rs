use chrono::{Duration, Utc};
use serde::Serialize;

use crate::adaptive::types::{
    Asset, ContentFormat, Difficulty, LearningPace, LearningStyle, Learner,
};
use crate::store::{CatalogStore, StoreError};

struct DemoLearner {
    id: &'static str,
    email: &'static str,
    full_name: &'static str,
    role: &'static str,
    current_skills: &'static [&'static str],
    target_skills: &'static [&'static str],
    style: LearningStyle,
    pace: LearningPace,
}

const DEMO_LEARNERS: &[DemoLearner] = &[
    DemoLearner {
        id: "demo-ned",
        email: "newbie@example.com",
        full_name: "Newbie Ned",
        role: "Junior Developer",
        current_skills: &["HTML", "CSS"],
        target_skills: &["Python", "JavaScript", "React"],
        style: LearningStyle::Video,
        pace: LearningPace::Slow,
    },
    DemoLearner {
        id: "demo-fiona",
        email: "fast@example.com",
        full_name: "Fast Fiona",
        role: "Senior Developer",
        current_skills: &["Python", "JavaScript", "SQL"],
        target_skills: &["Kubernetes", "AWS", "Machine Learning"],
        style: LearningStyle::Text,
        pace: LearningPace::Fast,
    },
];

struct DemoAsset {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    format: ContentFormat,
    skill: &'static str,
    difficulty: u8,
    minutes: u32,
    cheatsheet: Option<&'static str>,
}

const DEMO_ASSETS: &[DemoAsset] = &[
    DemoAsset {
        id: "py-intro",
        title: "Intro to Python",
        description: "Video tutorial on variables and loops.",
        format: ContentFormat::Video,
        skill: "Python",
        difficulty: 1,
        minutes: 10,
        cheatsheet: Some("- Variables hold values\n- `for x in items:` loops over a sequence"),
    },
    DemoAsset {
        id: "py-syntax",
        title: "Python Syntax Guide",
        description: "Text-based guide on syntax.",
        format: ContentFormat::Html5,
        skill: "Python",
        difficulty: 1,
        minutes: 5,
        cheatsheet: None,
    },
    DemoAsset {
        id: "py-collections",
        title: "Python Lists & Dicts",
        description: "Deep dive into data structures.",
        format: ContentFormat::Html5,
        skill: "Python",
        difficulty: 2,
        minutes: 15,
        cheatsheet: Some("- Lists are ordered and mutable\n- Dicts map keys to values"),
    },
    DemoAsset {
        id: "py-shell",
        title: "Interactive Python Shell",
        description: "Practice basic commands.",
        format: ContentFormat::Scorm,
        skill: "Python",
        difficulty: 2,
        minutes: 10,
        cheatsheet: None,
    },
    DemoAsset {
        id: "py-decorators",
        title: "Decorators Explained",
        description: "Advanced functional programming.",
        format: ContentFormat::Video,
        skill: "Python",
        difficulty: 3,
        minutes: 20,
        cheatsheet: Some("- A decorator wraps a function and returns a new one"),
    },
    DemoAsset {
        id: "js-basics",
        title: "JavaScript Fundamentals",
        description: "Values, functions and scope.",
        format: ContentFormat::Video,
        skill: "JavaScript",
        difficulty: 1,
        minutes: 15,
        cheatsheet: None,
    },
    DemoAsset {
        id: "react-components",
        title: "React Components",
        description: "Props, state and composition.",
        format: ContentFormat::Pdf,
        skill: "React",
        difficulty: 2,
        minutes: 25,
        cheatsheet: None,
    },
    DemoAsset {
        id: "k8s-pods",
        title: "Kubernetes Pods and Deployments",
        description: "Running workloads on a cluster.",
        format: ContentFormat::Pdf,
        skill: "Kubernetes",
        difficulty: 3,
        minutes: 30,
        cheatsheet: None,
    },
    DemoAsset {
        id: "k8s-operators",
        title: "Writing Kubernetes Operators",
        description: "Controllers and custom resources.",
        format: ContentFormat::Scorm,
        skill: "Kubernetes",
        difficulty: 5,
        minutes: 60,
        cheatsheet: None,
    },
];

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub learners: usize,
    pub assets: usize,
    pub skipped: bool,
}

/// Inserts the demo learners and catalog unless the catalog already has assets.
pub async fn seed_demo_data<S: CatalogStore>(store: &S) -> Result<SeedReport, StoreError> {
    if store.count_assets().await? > 0 {
        tracing::debug!("catalog already populated, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let now = Utc::now();
    let mut report = SeedReport::default();

    for demo in DEMO_LEARNERS {
        if store.get_learner(demo.id).await?.is_some() {
            continue;
        }
        store
            .insert_learner(&Learner {
                id: demo.id.to_string(),
                email: demo.email.to_string(),
                full_name: demo.full_name.to_string(),
                role: demo.role.to_string(),
                department: Some("Engineering".to_string()),
                current_skills: demo.current_skills.iter().map(|s| s.to_string()).collect(),
                target_skills: demo.target_skills.iter().map(|s| s.to_string()).collect(),
                preferred_learning_style: demo.style,
                learning_pace: demo.pace,
                created_at: now,
            })
            .await?;
        report.learners += 1;
    }

    for (offset, demo) in DEMO_ASSETS.iter().enumerate() {
        let difficulty = Difficulty::new(demo.difficulty).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "seed asset {} has difficulty {}",
                demo.id, demo.difficulty
            ))
        })?;
        store
            .insert_asset(&Asset {
                id: demo.id.to_string(),
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                content_format: demo.format,
                skill_tag: demo.skill.to_string(),
                difficulty,
                estimated_duration_minutes: demo.minutes,
                cheatsheet: demo.cheatsheet.map(str::to_string),
                is_active: true,
                is_archived: false,
                created_at: now + Duration::seconds(offset as i64),
            })
            .await?;
        report.assets += 1;
    }

    tracing::info!(learners = report.learners, assets = report.assets, "seeded demo data");
    Ok(report)
}
