use crate::config::ConfigStore;
use crate::ops::git::GitOps;
use crate::prompt::LineReader;

pub struct App<G, R> {
    pub git: G,
    pub reader: R,
    pub config: ConfigStore,
}

impl<G: GitOps, R: LineReader> App<G, R> {
    pub fn new(git: G, reader: R, config: ConfigStore) -> Self {
        Self {
            git,
            reader,
            config,
        }
    }
}
