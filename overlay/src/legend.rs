use colorous::Color;

use transit::RouteNumber;

const PALETTE: [Color; 10] = colorous::CATEGORY10;

/// Which color each drawn route uses. Colors are handed out in the order routes are added,
/// cycling through a categorical palette.
#[derive(Clone, Default)]
pub struct Legend {
    entries: Vec<(RouteNumber, Color)>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn add(&mut self, route: &RouteNumber) {
        self.color(route);
    }

    /// The route's color, assigning the next one if the route isn't in the legend yet
    pub fn color(&mut self, route: &RouteNumber) -> Color {
        if let Some(color) = self.get(route) {
            return color;
        }
        let color = PALETTE[self.entries.len() % PALETTE.len()];
        self.entries.push((route.clone(), color));
        color
    }

    pub fn get(&self, route: &RouteNumber) -> Option<Color> {
        self.entries
            .iter()
            .find(|(number, _)| number == route)
            .map(|(_, color)| *color)
    }

    pub fn entries(&self) -> &[(RouteNumber, Color)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(c: Color) -> (u8, u8, u8) {
        (c.r, c.g, c.b)
    }

    #[test]
    fn colors_are_stable_and_distinct() {
        let mut legend = Legend::new();
        let r9 = RouteNumber("009".to_string());
        let r99 = RouteNumber("099".to_string());
        legend.add(&r9);
        legend.add(&r99);
        legend.add(&r9);
        assert_eq!(legend.len(), 2);
        assert_eq!(rgb(legend.color(&r9)), rgb(PALETTE[0]));
        assert_eq!(rgb(legend.color(&r99)), rgb(PALETTE[1]));

        legend.clear();
        assert!(legend.is_empty());
        assert!(legend.get(&r9).is_none());
        assert_eq!(rgb(legend.color(&r99)), rgb(PALETTE[0]));
    }

    #[test]
    fn palette_cycles() {
        let mut legend = Legend::new();
        for i in 0..PALETTE.len() + 1 {
            legend.add(&RouteNumber(format!("{i:03}")));
        }
        let last = legend.entries().last().unwrap().1;
        assert_eq!(rgb(last), rgb(PALETTE[0]));
    }
}
