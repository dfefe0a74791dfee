//! Logging what someone ate.
use crate::{
    backend::{Api, DayRange},
    config::{day_window, Config},
    fetch::{Derived, Fetch},
    forms::{PortionEditor, Submission},
    helpers::{enable_if, nutrient_details, only_macros},
    lens::lenses,
    model::{EatenRecord, NutrientMap},
    state::{State, Watcher},
    view::{Button, Input, Node},
};
use chrono::{Local, Utc};
use futures::FutureExt;
use std::rc::Rc;
use tracing::{debug, warn};

pub const EAT_ERROR: &str = "Uh-oh, something went wrong!";
pub const EAT_SUBMIT: &str = "I ate it!";

/// What each consumer ate today.
#[derive(Clone)]
pub struct DayTotals {
    api: Api,
    day_start_hour: u32,
    totals: Rc<Vec<(String, Derived<(u64, DayRange), NutrientMap>)>>,
}

impl DayTotals {
    pub fn new(api: Api, consumers: &[String], day_start_hour: u32) -> DayTotals {
        DayTotals {
            api,
            day_start_hour,
            totals: Rc::new(
                consumers
                    .iter()
                    .map(|consumer| (consumer.clone(), Derived::new(NutrientMap::new())))
                    .collect(),
            ),
        }
    }

    /// Fetches the totals of the current day, unless they were already fetched for this
    /// generation and day.
    pub fn refresh(&self, generation: u64) {
        let Some((start, end)) = day_window(&Local::now(), self.day_start_hour) else {
            warn!(hour = self.day_start_hour, "no such time today, not fetching day totals");
            return;
        };
        let range = DayRange::Between {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        };
        for (consumer, totals) in self.totals.iter() {
            let refreshed = totals.refresh((generation, range), |_| {
                let api = self.api.clone();
                let consumer = consumer.clone();
                Fetch::Request(async move { api.consumer_totals(&consumer, range).await }.boxed_local())
            });
            if refreshed {
                debug!(consumer = %consumer, generation, "fetching day totals");
            }
        }
    }

    /// Totals of a consumer.
    pub fn get(&self, consumer: &str) -> Option<NutrientMap> {
        self.totals
            .iter()
            .find(|(name, _)| name == consumer)
            .map(|(_, totals)| totals.get())
    }

    /// Macronutrient totals of every consumer who ate something.
    pub fn view(&self) -> Node {
        Node::group(
            "day-macros",
            self.totals
                .iter()
                .map(|(consumer, totals)| {
                    let totals = totals.get();
                    enable_if(!totals.is_empty(), || {
                        Node::group(
                            "personal-day-macros",
                            vec![Node::text(consumer.clone()), nutrient_details(&only_macros(&totals))],
                        )
                    })
                })
                .collect(),
        )
    }
}

/// The eat form: pick an edible, a quantity and a consumer, and record it.
///
/// Must be created and used from within a `tokio::task::LocalSet`.
pub struct EatForm {
    api: Api,
    draft: State<EatenRecord>,
    submission: Submission,
    portion: PortionEditor,
    totals: DayTotals,
    generation: State<u64>,
    _draft_watcher: Rc<dyn Watcher<EatenRecord>>,
    _generation_watcher: Rc<dyn Watcher<u64>>,
}

impl EatForm {
    pub fn new(api: Api, config: &Config) -> EatForm {
        let draft = State::new(EatenRecord::default());
        let portion = PortionEditor::new(api.clone(), None, config.min_query_len);
        let draft_watcher = {
            let portion = portion.clone();
            draft.watch(move |record: &EatenRecord| portion.sync(&record.food))
        };
        let totals = DayTotals::new(api.clone(), &config.consumers, config.day_start_hour);
        let generation = State::new(0);
        let generation_watcher = {
            let totals = totals.clone();
            generation.watch(move |generation: &u64| totals.refresh(*generation))
        };
        EatForm {
            api,
            draft,
            submission: Submission::new(),
            portion,
            totals,
            generation,
            _draft_watcher: draft_watcher,
            _generation_watcher: generation_watcher,
        }
    }

    pub fn draft(&self) -> &State<EatenRecord> {
        &self.draft
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn portion(&self) -> &PortionEditor {
        &self.portion
    }

    pub fn totals(&self) -> &DayTotals {
        &self.totals
    }

    /// Number of successful submissions.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Records the draft. Returns whether a write was sent.
    pub fn submit(&self) -> bool {
        submit_record(&self.api, &self.draft, &self.submission, &self.generation)
    }

    pub fn view(&self) -> Node {
        if self.submission.is_submitting() {
            return Node::Spinner;
        }
        let record = self.draft.get();
        let ((food, set_food), (consumer, set_consumer)) =
            lenses(&record, &self.draft.setter(), (EatenRecord::FOOD, EatenRecord::CONSUMER));
        let submit = {
            let (api, draft, submission, generation) = (
                self.api.clone(),
                self.draft.clone(),
                self.submission.clone(),
                self.generation.clone(),
            );
            move || {
                submit_record(&api, &draft, &submission, &generation);
            }
        };

        Node::group(
            "macro-traco",
            vec![
                Node::text("Macro-Micro-Tracko"),
                self.totals.view(),
                Node::group(
                    "eat-something",
                    vec![
                        Node::text("Eat something?"),
                        enable_if(self.submission.has_error(), || Node::text(EAT_ERROR)),
                        self.portion.view(&food, &set_food),
                        enable_if(food.edible.is_some(), || {
                            Input::new("consumer", consumer)
                                .placeholder("Your name")
                                .on_value_changed(move |text| set_consumer.set(text))
                                .into()
                        }),
                        enable_if(record.is_complete(), || Button::new(EAT_SUBMIT, submit).into()),
                    ],
                ),
            ],
        )
    }
}

fn submit_record(api: &Api, draft: &State<EatenRecord>, submission: &Submission, generation: &State<u64>) -> bool {
    let record = draft.get();
    if !record.is_complete() {
        debug!("eaten record is incomplete, not submitting");
        return false;
    }
    let api = api.clone();
    let set_draft = draft.setter();
    let set_generation = generation.setter();
    submission.submit(
        async move { api.record_eaten(&record).await },
        move |()| {
            set_draft.set(EatenRecord::default());
            set_generation.modify(|generation| generation + 1);
        },
    )
}
