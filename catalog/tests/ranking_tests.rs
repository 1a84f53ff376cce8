use catalog::loader::read_courses;
use catalog::rank::{MAX_RESULTS, SIMILARITY_THRESHOLD};
use catalog::{Catalog, CourseType, IndexOptions, LevelChoice, Query, QueryForm, Recommendation};
use std::io::Write;

fn catalog_from_csv(csv: &str) -> Catalog {
    let table = read_courses(csv.as_bytes()).unwrap();
    Catalog::new(table, IndexOptions::default())
}

fn web_catalog() -> Catalog {
    catalog_from_csv(
        "course_title,content_duration,is_paid,level,url\n\
         Intro to Web Development,10 hours,False,Beginner Level,https://example.com/intro\n\
         Advanced Web Dev Patterns,40 hours,True,Expert Level,https://example.com/advanced\n",
    )
}

fn titles(rec: &Recommendation) -> Vec<&str> {
    rec.results().iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn duration_cap_excludes_long_course() {
    let catalog = web_catalog();
    let query = QueryForm {
        keyword: "web development".into(),
        daily_hours: 2.0,
        num_days: 6.0,
        course_type: CourseType::Both,
        level: LevelChoice::AllLevels,
    }
    .into_query()
    .unwrap();
    let rec = catalog.recommend(&query);
    assert_eq!(titles(&rec), vec!["Intro to Web Development"]);
    let hit = &rec.results()[0];
    assert_eq!(hit.duration_raw, "10 hours");
    assert_eq!(hit.is_paid, Some(false));
    assert_eq!(hit.level.as_deref(), Some("Beginner Level"));
    assert_eq!(hit.url, "https://example.com/intro");
}

#[test]
fn unknown_keyword_has_no_matches() {
    let catalog = web_catalog();
    let rec = catalog.recommend(&Query::new("zzz_nonexistent_term", 100.0));
    assert_eq!(rec, Recommendation::NoMatches);
}

#[test]
fn blank_keyword_needs_keyword() {
    let catalog = web_catalog();
    assert_eq!(catalog.recommend(&Query::new("", 100.0)), Recommendation::NeedsKeyword);
    assert_eq!(catalog.recommend(&Query::new("   ", 0.0).paid(true)), Recommendation::NeedsKeyword);
    assert_eq!(catalog.courses().len(), 2);
}

#[test]
fn paid_and_level_filters_apply() {
    let catalog = web_catalog();
    let rec = catalog.recommend(&Query::new("web", 100.0).paid(true));
    assert_eq!(titles(&rec), vec!["Advanced Web Dev Patterns"]);

    let rec = catalog.recommend(&Query::new("web", 100.0).level("beginner level"));
    assert_eq!(titles(&rec), vec!["Intro to Web Development"]);

    let rec = catalog.recommend(&Query::new("web", 100.0).paid(true).level("Beginner Level"));
    assert_eq!(rec, Recommendation::NoMatches);
}

#[test]
fn missing_is_paid_column_skips_paid_filter() {
    let catalog = catalog_from_csv(
        "course_title,content_duration,level,url\n\
         Intro to Web Development,10 hours,Beginner Level,u1\n\
         Web Design Basics,5 hours,Beginner Level,u2\n",
    );
    assert!(!catalog.schema().has_is_paid);
    let paid = catalog.recommend(&Query::new("web", 100.0).paid(true));
    let any = catalog.recommend(&Query::new("web", 100.0));
    assert_eq!(paid, any);
    assert_eq!(paid.results().len(), 2);
}

#[test]
fn missing_level_column_skips_level_filter() {
    let catalog = catalog_from_csv(
        "course_title,content_duration\n\
         Intro to Web Development,10 hours\n",
    );
    let rec = catalog.recommend(&Query::new("web", 100.0).level("Expert Level"));
    assert_eq!(rec.results().len(), 1);
}

#[test]
fn results_are_capped_and_sorted() {
    let mut csv = String::from("course_title,content_duration,is_paid,level,url\n");
    for i in 0..25 {
        let title = if i % 2 == 0 { format!("Guitar Lessons {i}") } else { format!("Guitar Lessons Blues Rock Jazz {i}") };
        csv.push_str(&format!("{title},{} hours,True,All Levels,u{i}\n", i % 7 + 1));
    }
    let catalog = catalog_from_csv(&csv);
    let rec = catalog.recommend(&Query::new("guitar lessons", 5.0));
    let results = rec.results();
    // 19 rows fit the budget, so the cap decides the length
    assert_eq!(results.len(), MAX_RESULTS);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    for r in results {
        assert!(r.score > SIMILARITY_THRESHOLD);
        assert!(catalog.courses()[r.id].duration_hours <= 5.0);
    }
}

#[test]
fn ties_keep_table_order() {
    let catalog = catalog_from_csv(
        "course_title,content_duration\n\
         Photography Basics,3 hours\n\
         Cooking Basics,3 hours\n\
         Photography Basics,4 hours\n\
         Photography Basics,2 hours\n",
    );
    let rec = catalog.recommend(&Query::new("photography basics", 10.0));
    let ids: Vec<usize> = rec.results().iter().map(|r| r.id).collect();
    assert_eq!(&ids[..3], &[0, 2, 3]);
}

#[test]
fn blank_form_keyword_beats_invalid_budget() {
    let catalog = web_catalog();
    let form = QueryForm {
        keyword: " ".into(),
        daily_hours: 0.0,
        num_days: -1.0,
        course_type: CourseType::Paid,
        level: LevelChoice::Expert,
    };
    assert_eq!(catalog.recommend_form(form).unwrap(), Recommendation::NeedsKeyword);

    let form = QueryForm {
        keyword: "web".into(),
        daily_hours: 0.0,
        num_days: 5.0,
        course_type: CourseType::Both,
        level: LevelChoice::AllLevels,
    };
    assert!(catalog.recommend_form(form).is_err());
}

#[test]
fn ranking_is_deterministic() {
    let catalog = web_catalog();
    let query = Query::new("web development patterns", 50.0);
    assert_eq!(catalog.recommend(&query), catalog.recommend(&query));
}

#[test]
fn weak_matches_never_reach_filters() {
    // "web" is swamped by a heavily repeated term in the second title.
    let heavy = vec!["Photography"; 12].join(" ");
    let catalog = catalog_from_csv(&format!(
        "course_title,content_duration\n\
         Web,1 hour\n\
         Web {heavy},1 hour\n\
         Photography Basics,1 hour\n"
    ));
    let scores = catalog.index().scores("web");
    assert!(scores[1] > 0.0 && scores[1] <= SIMILARITY_THRESHOLD);
    let rec = catalog.recommend(&Query::new("web", 10.0));
    assert_eq!(titles(&rec), vec!["Web"]);
}

#[test]
fn indexed_courses_all_have_durations() {
    let catalog = catalog_from_csv(
        "course_title,content_duration\n\
         A course,2.5 hours\n\
         Another course,\n\
         Third course,Unknown\n\
         Fourth course,45 mins\n",
    );
    assert_eq!(catalog.courses().len(), 2);
    assert_eq!(catalog.summary().dropped_rows, 2);
    assert!(catalog.courses().iter().all(|c| c.duration_hours.is_finite()));
    assert_eq!(catalog.index().num_docs() as usize, catalog.courses().len());
}

#[test]
fn empty_titles_never_match() {
    let catalog = catalog_from_csv("content_duration\n3 hours\n4 hours\n");
    assert_eq!(catalog.index().num_terms(), 0);
    assert_eq!(catalog.recommend(&Query::new("anything", 10.0)), Recommendation::NoMatches);
}

#[test]
fn opens_catalog_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "course_title,content_duration,url\nRust for Beginners,6 hours,https://example.com/rust\n").unwrap();
    let catalog = Catalog::open(file.path(), IndexOptions::default()).unwrap();
    let rec = catalog.recommend(&Query::new("rust", 10.0));
    assert_eq!(titles(&rec), vec!["Rust for Beginners"]);
}
